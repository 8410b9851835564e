use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("relaychat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("relaychat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("relaychat.client.request_duration_seconds");

pub(crate) static SESSION_SUBMISSIONS: Counter = Counter::new("relaychat.session.submissions");
pub(crate) static SESSION_IGNORED: Counter = Counter::new("relaychat.session.ignored");
pub(crate) static SESSION_REJECTED: Counter = Counter::new("relaychat.session.rejected");
pub(crate) static SESSION_SUCCESSES: Counter = Counter::new("relaychat.session.successes");
pub(crate) static SESSION_TRANSPORT_ERRORS: Counter =
    Counter::new("relaychat.session.transport_errors");
pub(crate) static SESSION_RESPONDER_ERRORS: Counter =
    Counter::new("relaychat.session.responder_errors");
pub(crate) static SESSION_FORMAT_ERRORS: Counter = Counter::new("relaychat.session.format_errors");
pub(crate) static SESSION_ROLLBACKS: Counter = Counter::new("relaychat.session.rollbacks");
pub(crate) static SESSION_ABANDONED: Counter = Counter::new("relaychat.session.abandoned");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_SUBMISSIONS);
    collector.register_counter(&SESSION_IGNORED);
    collector.register_counter(&SESSION_REJECTED);
    collector.register_counter(&SESSION_SUCCESSES);
    collector.register_counter(&SESSION_TRANSPORT_ERRORS);
    collector.register_counter(&SESSION_RESPONDER_ERRORS);
    collector.register_counter(&SESSION_FORMAT_ERRORS);
    collector.register_counter(&SESSION_ROLLBACKS);
    collector.register_counter(&SESSION_ABANDONED);
}
