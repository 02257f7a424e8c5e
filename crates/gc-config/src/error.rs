#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("option [{section}] {key} is required but was not set")]
    MissingRequired { section: String, key: String },
    #[error("option [{section}] {key} = {value:?} is not a valid integer")]
    InvalidInt {
        section: String,
        key: String,
        value: String,
    },
    #[error("valid boolean expressions are: \"true\", \"false\" (got {value:?})")]
    InvalidBool { value: String },
    #[error("valid time expressions have the format hh[:mm[:ss]] (got {value:?})")]
    InvalidTime { value: String },
    #[error("{value:?} is not one of the valid choices: {choices:?}")]
    InvalidChoice { value: String, choices: Vec<String> },
    #[error("path {value:?} does not exist and must_exist was requested")]
    PathNotFound { value: String },
    #[error("no plugin named {name:?} is registered for {kind}")]
    UnknownPlugin { kind: String, name: String },
}
