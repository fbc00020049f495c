use shared::Error;

// Memcached rejects longer keys; Redis accepts anything, so the stricter rule wins
const MAX_KEY_BYTES: usize = 250;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    EmptyKey,
    KeyTooLong { len: usize, max: usize },
    InvalidKeyCharacter { position: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyKey => write!(f, "key cannot be empty"),
            ValidationError::KeyTooLong { len, max } => {
                write!(f, "key is {} bytes long (max: {})", len, max)
            }
            ValidationError::InvalidKeyCharacter { position } => write!(
                f,
                "key contains whitespace or a control character at byte {}",
                position
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

/// Checks a key against the rules every supported backend accepts
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }

    if key.len() > MAX_KEY_BYTES {
        return Err(ValidationError::KeyTooLong {
            len: key.len(),
            max: MAX_KEY_BYTES,
        });
    }

    if let Some((position, _)) = key
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || c.is_control())
    {
        return Err(ValidationError::InvalidKeyCharacter { position });
    }

    Ok(())
}
