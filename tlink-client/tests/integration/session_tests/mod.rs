mod test_duplicate_answer_is_noop;
mod test_transport_failure_fails_session;
