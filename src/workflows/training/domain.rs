use serde::{Deserialize, Serialize};

/// Attachment type the backend requires for bank-transfer payments.
pub const BANK_TRANSFER_RECEIPT: &str = "BANK_TRANSFER_RECEIPT";

/// Training session picked by the applicant. Only the fields the submission flow reads are
/// modelled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: String,
    #[serde(default)]
    pub training: Option<TrainingSummary>,
}

impl TrainingSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            training: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.training = Some(TrainingSummary {
            title: title.into(),
        });
        self
    }

    /// Display title of the parent training, if the session carries one.
    pub fn training_title(&self) -> Option<&str> {
        self.training.as_ref().map(|training| training.title.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub title: String,
}

/// Payment options offered on the application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Online,
    Transfer,
}

impl PaymentMethod {
    pub const fn code(self) -> &'static str {
        match self {
            PaymentMethod::Online => "ONLINE",
            PaymentMethod::Transfer => "TRANSFER",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => Some(Self::Online),
            "TRANSFER" => Some(Self::Transfer),
            _ => None,
        }
    }

    /// Whether the backend rejects the application without a bank-transfer receipt.
    pub const fn requires_bank_receipt(self) -> bool {
        matches!(self, PaymentMethod::Transfer)
    }
}

/// A file already uploaded by the upload widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    pub name: String,
}

impl UploadedFile {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// Uploaded files keyed by attachment type, iterated in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFiles {
    entries: Vec<(String, UploadedFile)>,
}

impl UploadedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the file for `kind`. A replaced entry keeps its position.
    pub fn insert(&mut self, kind: impl Into<String>, file: UploadedFile) {
        let kind = kind.into();
        match self.entries.iter_mut().find(|(key, _)| *key == kind) {
            Some((_, existing)) => *existing = file,
            None => self.entries.push((kind, file)),
        }
    }

    pub fn remove(&mut self, kind: &str) -> Option<UploadedFile> {
        let index = self.entries.iter().position(|(key, _)| key == kind)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, kind: &str) -> Option<&UploadedFile> {
        self.entries
            .iter()
            .find(|(key, _)| key == kind)
            .map(|(_, file)| file)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.get(kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UploadedFile)> {
        self.entries.iter().map(|(key, file)| (key.as_str(), file))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, UploadedFile)> for UploadedFiles {
    fn from_iter<I: IntoIterator<Item = (K, UploadedFile)>>(iter: I) -> Self {
        let mut files = Self::new();
        for (kind, file) in iter {
            files.insert(kind, file);
        }
        files
    }
}
