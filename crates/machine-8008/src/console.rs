//! Console: the platform's only character device.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

/// Byte-oriented terminal attached to the machine.
pub trait Console {
    /// Next input byte, if one is ready. Never blocks.
    fn poll(&mut self) -> Option<u8>;

    /// Block until an input byte arrives. `None` means input has ended and
    /// nothing more will arrive.
    fn wait(&mut self) -> Option<u8>;

    fn write(&mut self, byte: u8) -> io::Result<()>;
}

/// Console on the process's stdin and stdout.
///
/// A reader thread feeds stdin into a channel so `poll` never blocks.
pub struct StdConsole {
    input: Receiver<u8>,
    closed: bool,
}

impl StdConsole {
    /// Start the stdin reader thread.
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("console-stdin".to_owned())
            .spawn(move || {
                for byte in io::stdin().lock().bytes() {
                    match byte {
                        Ok(b) => {
                            if tx.send(b).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("stdin read failed: {e}");
                            break;
                        }
                    }
                }
                debug!("stdin reader finished");
            })?;
        Ok(Self {
            input: rx,
            closed: false,
        })
    }
}

impl Console for StdConsole {
    fn poll(&mut self) -> Option<u8> {
        match self.input.try_recv() {
            Ok(byte) => Some(byte),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn wait(&mut self) -> Option<u8> {
        if self.closed {
            return None;
        }
        let byte = self.input.recv().ok();
        self.closed = byte.is_none();
        byte
    }

    fn write(&mut self, byte: u8) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(&[byte])?;
        out.flush()
    }
}

/// In-memory console: input is a fixed script, output is collected.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl ScriptedConsole {
    #[must_use]
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    /// Queue more input.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Bytes not yet read by the machine.
    #[must_use]
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }

    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Output decoded as UTF-8, lossily.
    #[must_use]
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Console for ScriptedConsole {
    fn poll(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn wait(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }
}
