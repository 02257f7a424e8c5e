pub mod add_file_prefix;
pub mod determine_events;
pub mod files_from_data_provider;
pub mod files_from_job_info;
pub mod files_from_ls;
pub mod job_info_from_output_dir;
pub mod match_delimiter;
pub mod match_on_filename;
pub mod metadata_from_task;
pub mod null;
pub mod output_dirs;

pub use add_file_prefix::AddFilePrefix;
pub use determine_events::{DetermineEvents, EventsSource};
pub use files_from_data_provider::FilesFromDataProvider;
pub use files_from_job_info::FilesFromJobInfo;
pub use files_from_ls::FilesFromLs;
pub use job_info_from_output_dir::JobInfoFromOutputDir;
pub use match_delimiter::MatchDelimiter;
pub use match_on_filename::MatchOnFilename;
pub use metadata_from_task::MetadataFromTask;
pub use null::NullScanner;
pub use output_dirs::{OutputDirsFromConfig, OutputDirsFromWork};
