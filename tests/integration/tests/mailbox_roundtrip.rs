use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
    thread,
    time::{Duration, Instant},
};

use integrador_integration_tests::FakeProcessor;
use integrador_mailbox::{
    CommandRequest, IntegradorClient, IntegradorConfig, IntegradorError, SessionId,
};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(500_000);

fn unique_session(_candidate: SessionId) -> SessionId {
    SessionId::new(NEXT_SESSION.fetch_add(1, Ordering::SeqCst))
}

fn config(root: &Path, timeout_ms: i64, poll_interval_ms: u64) -> IntegradorConfig {
    let config = IntegradorConfig {
        input_dir: root.join("Input"),
        output_dir: root.join("Output"),
        timeout_ms,
        poll_interval_ms,
        validator_access_key: "25CFE35B".to_string(),
    };
    fs::create_dir_all(&config.input_dir).expect("input dir");
    fs::create_dir_all(&config.output_dir).expect("output dir");
    config
}

#[test]
fn round_trip_through_filesystem_mailbox() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let config = config(tempdir.path(), 5_000, 20);
    let processor = FakeProcessor::start(
        config.input_dir.clone(),
        config.output_dir.clone(),
        Duration::from_millis(100),
    );
    let client = IntegradorClient::from_config(&config)
        .expect("client")
        .with_session_provider(unique_session);

    let exchange = client
        .check_validator_status(12, "30146465000116")
        .expect("exchange");

    assert_eq!(exchange.response.identifier, exchange.session_id.to_string());
    assert_eq!(exchange.response.code.as_deref(), Some("AP"));
    assert_eq!(exchange.response.payload.as_deref(), Some("<retorno>1</retorno>"));

    let stem = format!("VerificarStatusValidador_{}", exchange.session_id);
    let audit = fs::read_to_string(client.mailbox().audit_path(&stem)).expect("audit copy");
    assert_eq!(audit, exchange.command_text);
    assert_eq!(processor.seen(), vec![exchange.command_text.clone()]);
    assert!(!config.output_dir.join("resp-1.xml").exists());
    assert!(client.mailbox().processed_dir().join("resp-1.xml").exists());
    assert!(!config.input_dir.join(format!("{stem}.tmp")).exists());
}

#[test]
fn processor_only_sees_complete_commands() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let config = config(tempdir.path(), 5_000, 10);
    let processor = FakeProcessor::start(
        config.input_dir.clone(),
        config.output_dir.clone(),
        Duration::ZERO,
    );
    let client = IntegradorClient::from_config(&config)
        .expect("client")
        .with_session_provider(unique_session);

    for index in 0..5 {
        let request = CommandRequest::new("VFP-e", "EnviarStatusPagamento")
            .param("IdFila", index as i64)
            .param("Observacao", "x".repeat(64 * 1024));
        client.send(&request, true).expect("exchange");
    }

    let seen = processor.seen();
    assert_eq!(seen.len(), 5);
    for command in seen {
        assert!(command.ends_with("</Integrador>"), "partial command observed");
    }
}

#[test]
fn times_out_when_no_response_arrives() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let config = config(tempdir.path(), 300, 100);
    fs::write(
        config.output_dir.join("alheio.xml"),
        "<Integrador><Identificador><Valor>1</Valor></Identificador></Integrador>",
    )
    .expect("unrelated response");
    let client = IntegradorClient::from_config(&config)
        .expect("client")
        .with_session_provider(|_candidate: SessionId| SessionId::new(424_242));

    let started = Instant::now();
    let error = client
        .send(&CommandRequest::new("VFP-e", "EnviarPagamento"), false)
        .expect_err("timeout");
    let elapsed = started.elapsed();

    assert!(matches!(error, IntegradorError::Timeout { .. }), "{error}");
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(300 + 100 + 250), "{elapsed:?}");
    assert!(config.output_dir.join("alheio.xml").exists());
    assert!(config
        .input_dir
        .join("Enviados")
        .join("EnviarPagamento_424242.xml")
        .exists());
}

fn latin1_document(session_id: u64, message: &[u8]) -> Vec<u8> {
    let mut bytes = format!(
        "<Integrador><Identificador><Valor>{session_id}</Valor></Identificador><Resposta><Mensagem>"
    )
    .into_bytes();
    bytes.extend_from_slice(message);
    bytes.extend_from_slice(b"</Mensagem></Resposta></Integrador>");
    bytes
}

#[test]
fn latin1_response_is_matched_and_archived() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let config = config(tempdir.path(), 2_000, 20);
    // "Sessão" in ISO-8859-1.
    let message = b"Sess\xe3o encerrada";
    let other = config.output_dir.join("a-outra-sessao.xml");
    fs::write(&other, latin1_document(9090, message)).expect("other response");
    let target = config.output_dir.join("b-resposta.xml");
    fs::write(&target, latin1_document(8080, message)).expect("response");
    let client = IntegradorClient::from_config(&config)
        .expect("client")
        .with_session_provider(|_candidate: SessionId| SessionId::new(8080));

    let exchange = client
        .send(&CommandRequest::new("VFP-e", "RespostaFiscal"), false)
        .expect("exchange");
    assert_eq!(exchange.response.identifier, "8080");
    assert!(exchange.response_text.contains("Sess\u{FFFD}o encerrada"));
    assert!(!target.exists());
    assert!(config
        .output_dir
        .join("Processados")
        .join("b-resposta.xml")
        .exists());
    assert!(other.exists());
}

#[test]
fn separate_clients_share_one_mailbox() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let config = config(tempdir.path(), 5_000, 10);
    let _processor = FakeProcessor::start(
        config.input_dir.clone(),
        config.output_dir.clone(),
        Duration::from_millis(30),
    );

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let config = config.clone();
            thread::spawn(move || {
                let client = IntegradorClient::from_config(&config)
                    .expect("client")
                    .with_session_provider(unique_session);
                client.consult_session(1).expect("exchange")
            })
        })
        .collect();

    for handle in handles {
        let exchange = handle.join().expect("join");
        assert_eq!(exchange.response.identifier, exchange.session_id.to_string());
    }
    let processed = fs::read_dir(config.output_dir.join("Processados"))
        .expect("processed dir")
        .count();
    assert_eq!(processed, 3);
}
