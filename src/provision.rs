use super::command::Session;
use super::constants::{DEFAULT_PASSWORD, DEFAULT_USERNAME};
use super::endpoint::Endpoint;
use super::error::Error;
use super::session::{LogoutStatus, Outcome, SessionClient};
use super::settings::Write;
use super::transport::{Transport, TransportPolicy};

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use std::fmt;
use std::sync::Arc;

/// Login for a handset's web interface
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<S: Into<String>>(username: S, password: S) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Factory login of the handsets
impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One handset to provision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    pub endpoint: Endpoint,
    pub credentials: Credentials,
    /// Token from an earlier run. When set no login is made.
    pub session: Option<Session>,
    /// Leave the session open (and the writes uncommitted) instead of logging off
    pub keep_session: bool,
}

impl DeviceTarget {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            credentials: Credentials::default(),
            session: None,
            keep_session: false,
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn keep_session(mut self, keep: bool) -> Self {
        self.keep_session = keep;
        self
    }
}

/// How one write went
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub setting: &'static str,
    /// Status the handset answered with, absent if it never answered
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl WriteReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// How a handset's provisioning went
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceReport {
    pub endpoint: Endpoint,
    pub writes: Vec<WriteReport>,
    /// The handset acknowledged the logoff and is committing the writes
    pub logged_out: bool,
    /// The handset accepted a reboot, which ended the session without a logoff
    pub rebooted: bool,
    /// Live token, reported only when the session was kept open
    pub session: Option<Session>,
    /// Failure that stopped the sequence, or a failed logoff
    pub error: Option<String>,
}

impl DeviceReport {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            writes: Vec::new(),
            logged_out: false,
            rebooted: false,
            session: None,
            error: None,
        }
    }

    fn failed<E: ToString>(endpoint: Endpoint, error: E) -> Self {
        let mut report = Self::new(endpoint);
        report.error = Some(error.to_string());
        report
    }

    /// No error and every write accepted
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.writes.iter().all(WriteReport::is_success)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Log in (or resume), apply `writes` in order, then log off
///
/// A write the handset rejects is recorded and the remaining writes are still
/// sent. A write that cannot reach the handset stops the sequence. With
/// [`keep_session`](DeviceTarget::keep_session) the session is left open and its
/// token returned in the report.
///
/// An accepted reboot write ends the sequence: the handset restarts, drops the
/// session and has nothing left to commit, so no logoff follows. A kept session
/// never sends a reboot, since its token would be dead on return.
pub async fn provision<T: Transport>(
    client: &mut SessionClient<T>,
    target: &DeviceTarget,
    writes: &[Write],
) -> DeviceReport {
    let mut report = DeviceReport::new(client.endpoint().clone());

    match &target.session {
        Some(session) => client.resume(session.clone()),
        None => {
            let creds = &target.credentials;
            if let Err(e) = client.login(&creds.username, &creds.password).await {
                log::warn!(target: "necsip::provision", "{}", e);
                report.error = Some(e.to_string());
                return report;
            }
        }
    }

    for write in writes {
        let reboot = write.action.is_reboot();
        if reboot && target.keep_session {
            log::info!(
                target: "necsip::provision",
                "Skipping {} on {}, the session is kept open",
                write.setting,
                report.endpoint
            );
            continue;
        }

        let result = client
            .execute(write.action.clone())
            .await
            .and_then(Outcome::error_for_status);

        match result {
            Ok(outcome) => {
                report.writes.push(WriteReport {
                    setting: write.setting,
                    status: Some(outcome.status),
                    error: None,
                });
                if reboot {
                    report.rebooted = true;
                    break;
                }
            }
            Err(e) => {
                log::warn!(target: "necsip::provision", "{}: {}", write.setting, e);
                let status = match &e {
                    Error::DeviceRejected { status, .. } => Some(*status),
                    _ => None,
                };
                let unreachable = e.is_transport();
                report.writes.push(WriteReport {
                    setting: write.setting,
                    status,
                    error: Some(e.to_string()),
                });
                if unreachable {
                    report.error = Some(e.to_string());
                    break;
                }
            }
        }
    }

    if report.rebooted {
        log::info!(target: "necsip::provision", "{} is rebooting", report.endpoint);
        client.invalidate();
        return report;
    }

    if target.keep_session {
        report.session = client.session().cloned();
        if let Some(session) = &report.session {
            log::info!(
                target: "necsip::provision",
                "Keeping session {} open on {}",
                session,
                report.endpoint
            );
        }
        return report;
    }

    match client.logout().await {
        Ok(LogoutStatus::Completed(outcome)) => match outcome.error_for_status() {
            Ok(_) => report.logged_out = true,
            Err(e) => {
                report.error.get_or_insert_with(|| e.to_string());
            }
        },
        Ok(LogoutStatus::AlreadyClosed) => {}
        Err(e) => {
            report.error.get_or_insert_with(|| e.to_string());
        }
    }
    report
}

/// Provision many handsets at once, at most `max_parallel` at a time
///
/// Each handset gets its own [`SessionClient`] over the shared transport. Reports
/// come back in the order of `targets`; a failing handset never stops the others.
pub async fn provision_all<T>(
    targets: Vec<DeviceTarget>,
    writes: Vec<Write>,
    transport: Arc<T>,
    policy: TransportPolicy,
    max_parallel: usize,
) -> Vec<DeviceReport>
where
    T: Transport + 'static,
{
    let parallel = max_parallel.min(targets.len()).max(1);
    let permits = Arc::new(Semaphore::new(parallel));
    let writes: Arc<[Write]> = writes.into();
    let mut tasks = JoinSet::new();

    log::debug!(
        target: "necsip::provision",
        "Provisioning {} handsets, {} at a time",
        targets.len(),
        parallel
    );

    for (index, target) in targets.iter().cloned().enumerate() {
        let permits = Arc::clone(&permits);
        let writes = Arc::clone(&writes);
        let transport = Arc::clone(&transport);
        let policy = policy.clone();

        tasks.spawn(async move {
            // The semaphore is never closed
            let _permit = permits.acquire_owned().await.ok();
            let report = match SessionClient::new(target.endpoint.clone(), transport, policy) {
                Ok(mut client) => provision(&mut client, &target, &writes).await,
                Err(e) => DeviceReport::failed(target.endpoint.clone(), e),
            };
            (index, report)
        });
    }

    let mut reports: Vec<Option<DeviceReport>> = targets.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, report)) => reports[index] = Some(report),
            Err(e) => log::error!(target: "necsip::provision", "Provisioning task failed: {}", e),
        }
    }

    targets
        .into_iter()
        .zip(reports)
        .map(|(target, report)| {
            report.unwrap_or_else(|| DeviceReport::failed(target.endpoint, "provisioning task failed"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use crate::settings::{FactoryReset, LanPortSettings};
    use crate::transport::mock::{ok, refused, status, MockTransport, LOGIN_PAGE};

    fn client(transport: MockTransport) -> SessionClient<MockTransport> {
        SessionClient::new(
            Endpoint::secure("10.0.0.5"),
            transport,
            TransportPolicy::default(),
        )
        .unwrap()
    }

    fn lan_writes() -> Vec<Write> {
        LanPortSettings {
            lldp_mode: Some(true),
            vlan_id: Some(20),
            ..LanPortSettings::default()
        }
        .writes()
        .unwrap()
    }

    #[tokio::test]
    async fn login_writes_logout() {
        let mut client = client(MockTransport::always(LOGIN_PAGE));
        let target = DeviceTarget::new(Endpoint::secure("10.0.0.5"));

        let report = provision(&mut client, &target, &lan_writes()).await;
        assert!(report.is_success());
        assert!(report.logged_out);
        assert!(report.session.is_none());
        assert_eq!(report.writes.len(), 2);

        let queries: Vec<String> = client.transport().sent().into_iter().map(|(_, q)| q).collect();
        assert_eq!(
            queries,
            vec![
                "/index.cgi?username=ADMIN&password=6633222",
                "/index.cgi?session=ab12&set=44604f3&item=1",
                "/index.cgi?session=ab12&set=41d044f&item=20",
                "/index.cgi?session=ab12&set=all",
            ]
        );
    }

    #[tokio::test]
    async fn rejected_write_does_not_stop_the_rest() {
        let mut client = client(MockTransport::new(|endpoint, query| {
            if query.contains("44604f3") {
                status(endpoint, 500, "busy")
            } else {
                ok(endpoint, LOGIN_PAGE)
            }
        }));
        let target = DeviceTarget::new(Endpoint::secure("10.0.0.5"));

        let report = provision(&mut client, &target, &lan_writes()).await;
        assert!(!report.is_success());
        assert!(report.error.is_none());
        assert!(report.logged_out);
        assert_eq!(report.writes[0].setting, "lan.lldp_mode");
        assert_eq!(report.writes[0].status, Some(500));
        assert!(report.writes[1].is_success());
        assert_eq!(client.transport().count(), 4);
    }

    #[tokio::test]
    async fn unreachable_write_stops_the_sequence() {
        let mut client = client(MockTransport::new(|endpoint, query| {
            if query.contains("set=") {
                refused(endpoint)
            } else {
                ok(endpoint, LOGIN_PAGE)
            }
        }));
        let target = DeviceTarget::new(Endpoint::secure("10.0.0.5"));

        let report = provision(&mut client, &target, &lan_writes()).await;
        assert_eq!(report.writes.len(), 1);
        assert_eq!(report.writes[0].status, None);
        assert!(report.error.is_some());
        assert!(!report.logged_out);
        // login, first write, logoff attempt
        assert_eq!(client.transport().count(), 3);
    }

    #[tokio::test]
    async fn failed_login_sends_no_writes() {
        let mut client = client(MockTransport::new(|endpoint, _| {
            status(endpoint, 401, "Unauthorized")
        }));
        let target = DeviceTarget::new(Endpoint::secure("10.0.0.5"))
            .credentials(Credentials::new("ADMIN", "wrong"));

        let report = provision(&mut client, &target, &lan_writes()).await;
        assert!(report.writes.is_empty());
        assert!(report.error.unwrap().contains("status 401"));
        assert_eq!(client.transport().count(), 1);
    }

    #[tokio::test]
    async fn resumed_session_kept_open_skips_reboot() {
        let mut client = client(MockTransport::always("ok"));
        let session = Session::new("zz99").unwrap();
        let target = DeviceTarget::new(Endpoint::secure("10.0.0.5"))
            .session(session.clone())
            .keep_session(true);
        let writes = FactoryReset::default().writes();

        let report = provision(&mut client, &target, &writes).await;
        assert_eq!(report.session, Some(session));
        assert!(!report.logged_out);
        assert!(!report.rebooted);
        assert_eq!(report.writes.len(), 1);
        assert_eq!(report.writes[0].setting, "factory.data_clear");

        let sent = client.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "/index.cgi?session=zz99&data_clear=4110430");
    }

    #[tokio::test]
    async fn factory_reset_reboots_without_logoff() {
        let mut client = client(MockTransport::always(LOGIN_PAGE));
        let target = DeviceTarget::new(Endpoint::secure("10.0.0.5"));
        let mut writes = lan_writes();
        writes.extend(FactoryReset::default().writes());

        let report = provision(&mut client, &target, &writes).await;
        assert!(report.is_success(), "{:?}", report);
        assert!(report.rebooted);
        assert!(!report.logged_out);
        assert!(report.session.is_none());
        assert_eq!(report.writes.len(), 4);
        assert_eq!(client.state(), &SessionState::Closed);

        let queries: Vec<String> = client.transport().sent().into_iter().map(|(_, q)| q).collect();
        assert_eq!(
            queries,
            vec![
                "/index.cgi?username=ADMIN&password=6633222",
                "/index.cgi?session=ab12&set=44604f3&item=1",
                "/index.cgi?session=ab12&set=41d044f&item=20",
                "/index.cgi?session=ab12&data_clear=4110430",
                "/index.cgi?session=ab12&hard_reset=4040408",
            ]
        );

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["rebooted"], true);
        assert_eq!(json["logged_out"], false);
    }

    #[tokio::test]
    async fn rejected_reboot_still_logs_off() {
        let mut client = client(MockTransport::new(|endpoint, query| {
            if query.contains("hard_reset") {
                status(endpoint, 500, "busy")
            } else {
                ok(endpoint, LOGIN_PAGE)
            }
        }));
        let target = DeviceTarget::new(Endpoint::secure("10.0.0.5"));

        let report = provision(&mut client, &target, &FactoryReset::default().writes()).await;
        assert!(!report.rebooted);
        assert!(report.logged_out);
        assert_eq!(report.writes[1].status, Some(500));
        assert_eq!(client.transport().count(), 4);
    }

    #[tokio::test]
    async fn report_serializes() {
        let mut client = client(MockTransport::always(LOGIN_PAGE));
        let target = DeviceTarget::new(Endpoint::secure("10.0.0.5")).keep_session(true);

        let report = provision(&mut client, &target, &lan_writes()).await;
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["session"], "ab12");
        assert_eq!(json["writes"][1]["setting"], "lan.vlan_id");
        assert_eq!(json["writes"][1]["status"], 200);
        assert_eq!(json["endpoint"]["scheme"], "secure");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let printed = format!("{:?}", Credentials::default());
        assert!(printed.contains("ADMIN"));
        assert!(!printed.contains("6633222"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fan_out_isolates_failures() {
        let transport = Arc::new(MockTransport::new(|endpoint, _| {
            if endpoint.host() == "10.0.0.6" {
                refused(endpoint)
            } else {
                ok(endpoint, LOGIN_PAGE)
            }
        }));
        let targets = vec![
            DeviceTarget::new(Endpoint::secure("10.0.0.5")),
            DeviceTarget::new(Endpoint::secure("10.0.0.6")),
            DeviceTarget::new(Endpoint::secure("10.0.0.7")),
        ];

        let reports = provision_all(
            targets,
            lan_writes(),
            Arc::clone(&transport),
            TransportPolicy::default(),
            2,
        )
        .await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].endpoint.host(), "10.0.0.5");
        assert!(reports[0].is_success());
        assert!(!reports[1].is_success());
        assert!(reports[1].writes.is_empty());
        assert!(reports[2].is_success());

        // 4 requests for each reachable handset, one login attempt for the other
        assert_eq!(transport.count(), 9);
        let logins = transport
            .sent()
            .iter()
            .filter(|(_, q)| q.starts_with("/index.cgi?username="))
            .count();
        assert_eq!(logins, 3);
    }

    #[tokio::test]
    async fn fan_out_with_zero_parallelism_still_runs() {
        let transport = Arc::new(MockTransport::always(LOGIN_PAGE));
        let reports = provision_all(
            vec![DeviceTarget::new(Endpoint::secure("10.0.0.5"))],
            Vec::new(),
            transport,
            TransportPolicy::default(),
            0,
        )
        .await;
        assert!(reports[0].logged_out);
        assert!(reports[0].writes.is_empty());
    }

    #[tokio::test]
    async fn fan_out_with_unbounded_parallelism() {
        let transport = Arc::new(MockTransport::always(LOGIN_PAGE));
        let targets = vec![
            DeviceTarget::new(Endpoint::secure("10.0.0.5")),
            DeviceTarget::new(Endpoint::secure("10.0.0.6")),
        ];

        let reports = provision_all(
            targets,
            lan_writes(),
            Arc::clone(&transport),
            TransportPolicy::default(),
            usize::MAX,
        )
        .await;
        assert!(reports.iter().all(DeviceReport::is_success));
        assert_eq!(transport.count(), 8);

        // No targets at all
        let reports = provision_all(
            Vec::new(),
            lan_writes(),
            transport,
            TransportPolicy::default(),
            usize::MAX,
        )
        .await;
        assert!(reports.is_empty());
    }
}
