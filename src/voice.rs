//! Speech in and out, backed by external commands.

use crate::error::VoiceError;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Text-to-speech command; the text is passed as the final argument.
    #[serde(default = "default_synthesizer")]
    pub synthesizer: Vec<String>,
    /// Speech-to-text command; prints one transcript on stdout and exits.
    #[serde(default)]
    pub recognizer: Option<Vec<String>>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            synthesizer: default_synthesizer(),
            recognizer: None,
        }
    }
}

fn default_synthesizer() -> Vec<String> {
    vec!["espeak-ng".into(), "-v".into(), "en-in".into()]
}

fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}

fn split_command(command: &[String]) -> Option<(String, Vec<String>)> {
    let (program, args) = command.split_first()?;
    find_program(program)?;
    Some((program.clone(), args.to_vec()))
}

/// Markdown markers read badly when spoken.
pub fn clean_for_speech(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '*' | '#' | '`')).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Speaking,
}

/// A running utterance. The waiter task on the runtime reaps the child as soon
/// as it exits; dropping `cancel` kills it.
struct Utterance {
    cancel: oneshot::Sender<()>,
    done: Arc<AtomicBool>,
}

pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    current: RefCell<Option<Utterance>>,
}

impl CommandSynthesizer {
    fn state(&self) -> SpeechState {
        let mut slot = self.current.borrow_mut();
        match slot.as_ref() {
            Some(u) if !u.done.load(Ordering::Acquire) => SpeechState::Speaking,
            _ => {
                *slot = None;
                SpeechState::Idle
            }
        }
    }

    fn cancel(&self) {
        if let Some(utterance) = self.current.borrow_mut().take() {
            let _ = utterance.cancel.send(());
        }
    }

    fn spawn(&self, text: &str) -> std::io::Result<Utterance> {
        let _guard = crate::utils::RUNTIME.enter();
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(clean_for_speech(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let (tx, rx) = oneshot::channel();
        let done = Arc::new(AtomicBool::new(false));
        let finished = done.clone();
        crate::utils::RUNTIME.spawn(async move {
            let cancelled = tokio::select! {
                status = child.wait() => {
                    if let Err(e) = status {
                        log::warn!("Speech synthesis wait failed: {}", e);
                    }
                    false
                }
                _ = rx => true,
            };
            if cancelled {
                let _ = child.kill().await;
            }
            finished.store(true, Ordering::Release);
        });
        Ok(Utterance { cancel: tx, done })
    }

    fn speak(&self, text: &str) {
        if self.state() == SpeechState::Speaking {
            self.cancel();
            return;
        }
        match self.spawn(text) {
            Ok(utterance) => *self.current.borrow_mut() = Some(utterance),
            Err(e) => log::error!("Could not start speech synthesis: {}", VoiceError::Spawn(e)),
        }
    }
}

pub enum Synthesizer {
    Available(CommandSynthesizer),
    Unavailable,
}

impl Synthesizer {
    pub fn detect(command: &[String]) -> Self {
        match split_command(command) {
            Some((program, args)) => Synthesizer::Available(CommandSynthesizer {
                program,
                args,
                current: RefCell::new(None),
            }),
            None => {
                log::info!("Speech output not available");
                Synthesizer::Unavailable
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Synthesizer::Available(_))
    }

    pub fn state(&self) -> SpeechState {
        match self {
            Synthesizer::Available(s) => s.state(),
            Synthesizer::Unavailable => SpeechState::Idle,
        }
    }

    /// Reads `text` aloud, or stops the utterance already playing.
    pub fn speak(&self, text: &str) {
        if let Synthesizer::Available(s) = self {
            s.speak(text);
        }
    }

    pub fn cancel(&self) {
        if let Synthesizer::Available(s) = self {
            s.cancel();
        }
    }
}

impl Drop for CommandSynthesizer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    Listening,
}

pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    state: Rc<Cell<ListenState>>,
    cancel: Rc<RefCell<Option<oneshot::Sender<()>>>>,
}

async fn capture(program: String, args: Vec<String>, cancel: oneshot::Receiver<()>) -> Result<Option<String>, VoiceError> {
    let mut child = tokio::process::Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;
    let mut stdout = child.stdout.take();
    let read = async {
        let mut out = String::new();
        if let Some(pipe) = stdout.as_mut() {
            pipe.read_to_string(&mut out).await?;
        }
        Ok::<_, std::io::Error>(out)
    };
    let finished = async { tokio::join!(child.wait(), read) };

    tokio::select! {
        (status, out) = finished => {
            let status = status?;
            if !status.success() {
                return Err(VoiceError::Exit(status));
            }
            let transcript = out?.trim().to_string();
            Ok((!transcript.is_empty()).then_some(transcript))
        }
        // Dropping the child kills it.
        _ = cancel => Ok(None),
    }
}

impl CommandRecognizer {
    fn listen(&self) -> impl Future<Output = Option<String>> + 'static {
        let state = self.state.clone();
        let cancel_slot = self.cancel.clone();
        let program = self.program.clone();
        let args = self.args.clone();

        let busy = state.get() == ListenState::Listening;
        let (tx, rx) = oneshot::channel();
        if !busy {
            state.set(ListenState::Listening);
            *cancel_slot.borrow_mut() = Some(tx);
        }

        async move {
            if busy {
                return None;
            }
            let result = crate::utils::run_on_runtime(capture(program, args, rx)).await;
            cancel_slot.borrow_mut().take();
            state.set(ListenState::Idle);
            match result {
                Ok(Ok(transcript)) => transcript,
                Ok(Err(e)) => {
                    log::error!("Speech recognition error: {}", e);
                    None
                }
                Err(e) => {
                    log::error!("Speech recognition error: {}", VoiceError::Runtime(e.to_string()));
                    None
                }
            }
        }
    }

    fn stop(&self) {
        if let Some(tx) = self.cancel.borrow_mut().take() {
            let _ = tx.send(());
        }
    }
}

pub enum Recognizer {
    Available(CommandRecognizer),
    Unavailable,
}

impl Recognizer {
    pub fn detect(command: Option<&[String]>) -> Self {
        match command.and_then(split_command) {
            Some((program, args)) => Recognizer::Available(CommandRecognizer {
                program,
                args,
                state: Rc::new(Cell::new(ListenState::Idle)),
                cancel: Rc::new(RefCell::new(None)),
            }),
            None => {
                log::info!("Speech input not available");
                Recognizer::Unavailable
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Recognizer::Available(_))
    }

    pub fn state(&self) -> ListenState {
        match self {
            Recognizer::Available(r) => r.state.get(),
            Recognizer::Unavailable => ListenState::Idle,
        }
    }

    /// Captures one utterance. Resolves to the transcript, or `None` when
    /// nothing was recognized, capture failed, was stopped, or another capture
    /// is already running.
    pub fn listen(&self) -> impl Future<Output = Option<String>> + 'static {
        let inner = match self {
            Recognizer::Available(r) => Some(r.listen()),
            Recognizer::Unavailable => None,
        };
        async move {
            match inner {
                Some(fut) => fut.await,
                None => None,
            }
        }
    }

    pub fn stop(&self) {
        if let Recognizer::Available(r) = self {
            r.stop();
        }
    }
}

pub struct VoiceIo {
    pub synthesizer: Rc<Synthesizer>,
    pub recognizer: Recognizer,
}

impl VoiceIo {
    pub fn detect(settings: &SpeechSettings) -> Self {
        Self {
            synthesizer: Rc::new(Synthesizer::detect(&settings.synthesizer)),
            recognizer: Recognizer::detect(settings.recognizer.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strips_markdown_markers() {
        assert_eq!(clean_for_speech("**Library** `9am` # open"), "Library 9am  open");
    }

    #[test]
    fn missing_programs_are_unavailable() {
        let synth = Synthesizer::detect(&cmd(&["definitely-not-a-tts-program"]));
        assert!(!synth.is_available());
        synth.speak("hello");
        assert_eq!(synth.state(), SpeechState::Idle);

        assert!(!Recognizer::detect(None).is_available());
        let rec = Recognizer::detect(Some(&cmd(&["definitely-not-an-stt-program"])));
        assert!(!rec.is_available());
        assert_eq!(rec.state(), ListenState::Idle);
    }

    #[test]
    fn speaking_again_cancels_current_utterance() {
        // `sh -c` binds the appended text to $0, so it is ignored.
        let synth = Synthesizer::detect(&cmd(&["sh", "-c", "sleep 5"]));
        assert!(synth.is_available());
        synth.speak("first");
        assert_eq!(synth.state(), SpeechState::Speaking);
        synth.speak("second");
        assert_eq!(synth.state(), SpeechState::Idle);
        synth.speak("third");
        assert_eq!(synth.state(), SpeechState::Speaking);
        synth.cancel();
        assert_eq!(synth.state(), SpeechState::Idle);
    }

    #[test]
    fn finished_utterance_is_reaped_without_polling() {
        let synth = Synthesizer::detect(&cmd(&["sh", "-c", "exit 0"]));
        synth.speak("short");
        let Synthesizer::Available(inner) = &synth else {
            panic!("sh should be available");
        };
        let done = inner.current.borrow().as_ref().map(|u| u.done.clone()).unwrap();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !done.load(Ordering::Acquire) && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(done.load(Ordering::Acquire));
        assert_eq!(synth.state(), SpeechState::Idle);
    }

    #[tokio::test]
    async fn recognizer_returns_transcript() {
        let rec = Recognizer::detect(Some(&cmd(&["echo", "where is the library"])));
        let fut = rec.listen();
        assert_eq!(rec.state(), ListenState::Listening);
        assert_eq!(fut.await.as_deref(), Some("where is the library"));
        assert_eq!(rec.state(), ListenState::Idle);
    }

    #[tokio::test]
    async fn blank_or_failed_capture_is_none() {
        let blank = Recognizer::detect(Some(&cmd(&["sh", "-c", "printf '  \\n'"])));
        assert_eq!(blank.listen().await, None);
        let failed = Recognizer::detect(Some(&cmd(&["sh", "-c", "exit 3"])));
        assert_eq!(failed.listen().await, None);
        assert_eq!(failed.state(), ListenState::Idle);
    }

    #[tokio::test]
    async fn stop_ends_capture_and_second_listen_is_ignored() {
        let rec = Recognizer::detect(Some(&cmd(&["sh", "-c", "sleep 5; echo late"])));
        let first = rec.listen();
        assert_eq!(rec.listen().await, None);
        rec.stop();
        assert_eq!(first.await, None);
        assert_eq!(rec.state(), ListenState::Idle);
    }

    #[tokio::test]
    async fn unavailable_recognizer_listens_to_nothing() {
        assert_eq!(Recognizer::Unavailable.listen().await, None);
    }
}
