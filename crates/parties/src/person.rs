use serde::{Deserialize, Serialize};

use ventapos_core::ValueObject;

/// Personal identity shared by customers and sellers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInfo {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
}

impl PersonInfo {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

impl ValueObject for PersonInfo {}
