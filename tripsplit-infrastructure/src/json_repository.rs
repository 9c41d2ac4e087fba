use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tripsplit_application::{RepositoryError, TripRepository, TripState};

/// Stores the whole trip state as one pretty-printed JSON document.
#[derive(Clone, Debug)]
pub struct JsonFileTripRepository {
    path: PathBuf,
}

impl JsonFileTripRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TripRepository for JsonFileTripRepository {
    fn load(&self) -> Result<Option<TripState>, RepositoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No trip store yet");
                return Ok(None);
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let state = serde_json::from_slice(&bytes)
            .map_err(|err| RepositoryError::Serialization(err.to_string()))?;
        Ok(Some(state))
    }

    /// Writes to a sibling `.tmp` file first and renames it over the store,
    /// so readers never observe a half-written document.
    fn save(&self, state: &TripState) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(state)
            .map_err(|err| RepositoryError::Serialization(err.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        let staging = self.staging_path();
        fs::write(&staging, json).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))?;

        tracing::debug!(path = %self.path.display(), "Trip store written");
        Ok(())
    }
}
