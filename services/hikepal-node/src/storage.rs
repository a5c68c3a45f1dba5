//! Node-side collaborators: a JSON track directory and a console chat.

use hikepal_core::{Track, TrackRecord};
use hikepal_tracking::{ChatError, LibraryError, MessageSink, OutboundMessage, TrackLibrary};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes each saved track to `<dir>/<id>.json`
#[derive(Debug, Clone)]
pub struct JsonTrackDir {
    dir: PathBuf,
}

impl JsonTrackDir {
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TrackLibrary for JsonTrackDir {
    fn store(&self, track: &Track) -> Result<(), LibraryError> {
        let record = TrackRecord::from(track);
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| LibraryError::Storage(e.to_string()))?;

        let path = self.path_for(&track.id);
        fs::write(&path, json)
            .map_err(|e| LibraryError::Storage(format!("{}: {}", path.display(), e)))?;

        info!(track_id = %track.id, path = %path.display(), "Track written");
        Ok(())
    }
}

/// Prints team messages to stdout
#[derive(Debug, Default)]
pub struct ConsoleChat;

impl MessageSink for ConsoleChat {
    fn send(&self, message: OutboundMessage) -> Result<(), ChatError> {
        println!("[team] {}: {}", message.sender_name, message.text);
        Ok(())
    }
}
