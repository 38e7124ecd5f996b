//! Shared fixtures for end-to-end mailbox tests.

use std::{
    fs,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

/// Extracts the `Identificador/Valor` text from a command document.
pub fn identifier_of(command: &str) -> Option<&str> {
    let start = command.find("<Identificador><Valor>")? + "<Identificador><Valor>".len();
    let len = command[start..].find("</Valor>")?;
    Some(&command[start..start + len])
}

/// Stand-in for the external processor: consumes active commands and answers
/// each one after `delay`, writing the response under an arbitrary name.
pub struct FakeProcessor {
    stop: Arc<AtomicBool>,
    seen: Arc<Mutex<Vec<String>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeProcessor {
    pub fn start(input_dir: PathBuf, output_dir: PathBuf, delay: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = {
            let stop = Arc::clone(&stop);
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                let mut counter = 0_u64;
                while !stop.load(Ordering::SeqCst) {
                    let entries = fs::read_dir(&input_dir).expect("read input");
                    for entry in entries.flatten() {
                        let path = entry.path();
                        if path.extension().and_then(|ext| ext.to_str()) != Some("xml") {
                            continue;
                        }
                        let Ok(command) = fs::read_to_string(&path) else {
                            continue;
                        };
                        fs::remove_file(&path).expect("consume command");
                        let id = identifier_of(&command).expect("identifier").to_string();
                        seen.lock().expect("seen").push(command);

                        thread::sleep(delay);
                        counter += 1;
                        let response = format!(
                            "<Integrador><Identificador><Valor>{id}</Valor></Identificador>\
                             <IntegradorResposta><Codigo>AP</Codigo><Valor>processado</Valor></IntegradorResposta>\
                             <Resposta><retorno>{counter}</retorno></Resposta></Integrador>"
                        );
                        let staging = output_dir.join(format!("resp-{counter}.part"));
                        fs::write(&staging, response).expect("write response");
                        fs::rename(&staging, output_dir.join(format!("resp-{counter}.xml")))
                            .expect("publish response");
                    }
                    thread::sleep(Duration::from_millis(10));
                }
            })
        };
        Self {
            stop,
            seen,
            handle: Some(handle),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("seen").clone()
    }
}

impl Drop for FakeProcessor {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
