//! Scripted command runner for unit tests

use crate::adb::{CommandOutput, CommandRunner};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Records every command and answers from a list of scripted responses.
///
/// A response matches when the space-joined arguments equal its pattern or
/// start with the pattern followed by a space; an empty pattern matches
/// anything. The first match wins; commands with no match succeed with
/// empty output.
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: Mutex<Vec<(String, CommandOutput)>>,
    calls: Mutex<Vec<String>>,
    detached: Mutex<Vec<String>>,
    pull_payload: Mutex<Option<Vec<u8>>>,
}

impl FakeRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, pattern: &str, output: CommandOutput) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push((pattern.to_string(), output));
        self
    }

    /// Bytes written to the destination of any successful `pull`
    pub fn pull_writes(&self, bytes: Vec<u8>) -> &Self {
        *self.pull_payload.lock().unwrap() = Some(bytes);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn detached(&self) -> Vec<String> {
        self.detached.lock().unwrap().clone()
    }

    fn lookup(&self, joined: &str) -> CommandOutput {
        self.responses
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| {
                pattern.is_empty()
                    || joined == pattern.as_str()
                    || joined.starts_with(&format!("{} ", pattern))
            })
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""))
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn output(&self, _program: &Path, args: &[String]) -> Result<CommandOutput> {
        let joined = args.join(" ");
        self.calls.lock().unwrap().push(joined.clone());
        let output = self.lookup(&joined);

        let is_pull = args.iter().any(|a| a == "pull");
        if is_pull && output.success {
            if let (Some(bytes), Some(dest)) =
                (self.pull_payload.lock().unwrap().clone(), args.last())
            {
                std::fs::write(PathBuf::from(dest), bytes)?;
            }
        }

        Ok(output)
    }

    fn spawn_detached(&self, _program: &Path, args: &[String]) -> Result<()> {
        self.detached.lock().unwrap().push(args.join(" "));
        Ok(())
    }
}

/// PNG bytes of a solid image with the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
    buffer.into_inner()
}
