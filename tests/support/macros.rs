#[macro_use]
macro_rules! login_page {
    ($token:expr) => {
        format!(
            indoc::indoc! {
                r#"<html>
                <head><title>DT900 Series</title></head>
                <frameset rows="60,*" border="0">
                    <frame name="menu" src="/index.cgi?session={}">
                    <frame name="main" src="/header.html">
                </frameset>
                </html>"#
            },
            $token
        )
    };
}

#[macro_use]
macro_rules! message_page {
    ($message:expr) => {
        format!(
            indoc::indoc! {
                "<html>
                <body>
                    <p>{}</p>
                </body>
                </html>"
            },
            $message
        )
    };
}
