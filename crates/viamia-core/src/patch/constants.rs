/// Filename of the bundled application archive
pub const ARCHIVE_NAME: &str = "app.asar";
/// Filename of the untouched copy kept next to the archive
pub const BACKUP_NAME: &str = "app.asar.bac";
/// Directory name the archive is unpacked into while patching
pub const WORKING_DIR_NAME: &str = "app_unpacked";
