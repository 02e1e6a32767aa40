pub mod csv;
pub mod error;
pub mod upload;

pub use csv::{data_file_name, records_to_csv, save_csv};
pub use error::ExportError;
pub use upload::{spawn_upload, upload_csv};
