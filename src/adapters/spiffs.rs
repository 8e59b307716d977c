//! SPIFFS-backed configuration storage.
//!
//! Implements [`StoragePort`] over the flash filesystem.  Writes go to a
//! scratch file that is renamed into place, so a power cut mid-write never
//! corrupts the previous document.
//!
//! On non-ESP targets the store is a plain in-memory cell.

use crate::app::ports::{StorageError, StoragePort};

#[cfg(target_os = "espidf")]
const MOUNT_POINT: &str = "/spiffs";
#[cfg(target_os = "espidf")]
const CONFIG_PATH: &str = "/spiffs/config.json";
#[cfg(target_os = "espidf")]
const SCRATCH_PATH: &str = "/spiffs/config.json.tmp";

pub struct SpiffsStorage {
    #[cfg(not(target_os = "espidf"))]
    memory: core::cell::RefCell<Option<Vec<u8>>>,
}

#[cfg(target_os = "espidf")]
impl SpiffsStorage {
    /// Register the SPIFFS partition with the VFS layer.  Formats on first
    /// boot if the partition is blank.
    pub fn mount() -> Result<Self, crate::error::Error> {
        use esp_idf_svc::sys;

        let base_path = c"/spiffs";
        let conf = sys::esp_vfs_spiffs_conf_t {
            base_path: base_path.as_ptr(),
            partition_label: core::ptr::null(),
            max_files: 4,
            format_if_mount_failed: true,
        };
        // SAFETY: conf and the path literal outlive the registration call;
        // ESP-IDF copies what it keeps.
        let err = unsafe { sys::esp_vfs_spiffs_register(&conf) };
        if err != sys::ESP_OK {
            return Err(crate::error::Error::Init("spiffs mount failed"));
        }
        log::info!("spiffs mounted at {MOUNT_POINT}");
        Ok(Self {})
    }
}

#[cfg(not(target_os = "espidf"))]
impl SpiffsStorage {
    pub fn mount() -> Result<Self, crate::error::Error> {
        Ok(Self {
            memory: core::cell::RefCell::new(None),
        })
    }
}

#[cfg(target_os = "espidf")]
impl StoragePort for SpiffsStorage {
    fn read_all(&self) -> Result<Vec<u8>, StorageError> {
        match std::fs::read(CONFIG_PATH) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(_) => Err(StorageError::IoError),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), StorageError> {
        std::fs::write(SCRATCH_PATH, data).map_err(|_| StorageError::IoError)?;
        std::fs::rename(SCRATCH_PATH, CONFIG_PATH).map_err(|_| StorageError::IoError)
    }
}

#[cfg(not(target_os = "espidf"))]
impl StoragePort for SpiffsStorage {
    fn read_all(&self) -> Result<Vec<u8>, StorageError> {
        self.memory.borrow().clone().ok_or(StorageError::NotFound)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), StorageError> {
        *self.memory.borrow_mut() = Some(data.to_vec());
        Ok(())
    }
}
