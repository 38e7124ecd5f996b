#![no_main]

use integrador_mailbox::{
    Envelope, IntegradorResponseParser, Parameters, ResponseMatcher, ResponseParser, SessionId,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u32, String, String, Vec<(String, String)>)| {
    let (id, component, method, pairs) = input;
    let session_id = SessionId::new(u64::from(id));
    let parameters = pairs
        .iter()
        .fold(Parameters::new(), |parameters, (name, value)| {
            parameters.with(name.as_str(), value.as_str())
        });

    let Ok(envelope) = Envelope::build(session_id, &component, &method, parameters, None) else {
        assert!(component.trim().is_empty() || method.trim().is_empty());
        return;
    };
    let xml = envelope.to_xml();
    assert!(ResponseMatcher::for_session(session_id).matches(&xml));
    let parsed = IntegradorResponseParser.parse(&xml).expect("rendered envelope parses");
    assert_eq!(parsed.identifier, session_id.to_string());
});
