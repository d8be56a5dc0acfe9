//! Configuration file on the SPIFFS data partition.
//!
//! Flash the partition from a directory holding `config.json`, e.g. with
//! `spiffsgen.py` and `esptool.py write_flash`, at the `storage` offset in
//! `partitions.csv`.

use esp_idf_svc::sys::{esp, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register, EspError};

pub const CONFIG_PATH: &str = "/spiffs/config.json";

/// Mount the `storage` partition at `/spiffs`, read-mostly.
pub fn mount() -> Result<(), EspError> {
    let conf = esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: c"storage".as_ptr(),
        max_files: 2,
        format_if_mount_failed: false,
    };

    // SAFETY: conf and its strings are 'static or outlive the call;
    // the VFS copies what it keeps.
    esp!(unsafe { esp_vfs_spiffs_register(&conf) })
}

/// Read the raw configuration document.
pub fn read_config() -> std::io::Result<Vec<u8>> {
    std::fs::read(CONFIG_PATH)
}
