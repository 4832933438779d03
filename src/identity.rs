//! Login gate. Teachers share one passphrase; students only pick a display name.

use thiserror::Error;

use crate::domain::{Role, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
  #[error("Incorrect password.")]
  IncorrectPassword,
  #[error("Please enter your name.")]
  MissingName,
}

/// Resolves login credentials to a user.
pub trait IdentityProvider: Send + Sync {
  fn authenticate(&self, role: Role, name: &str, passphrase: &str) -> Result<User, LoginError>;
}

/// Single shared teacher passphrase, no student accounts.
#[derive(Clone, Debug)]
pub struct PassphraseGate {
  teacher_passphrase: String,
}

impl PassphraseGate {
  pub fn new(teacher_passphrase: impl Into<String>) -> Self {
    Self { teacher_passphrase: teacher_passphrase.into() }
  }
}

impl IdentityProvider for PassphraseGate {
  fn authenticate(&self, role: Role, name: &str, passphrase: &str) -> Result<User, LoginError> {
    match role {
      Role::Teacher if passphrase == self.teacher_passphrase => Ok(User::teacher()),
      Role::Teacher => Err(LoginError::IncorrectPassword),
      Role::Student => {
        let name = name.trim();
        if name.is_empty() { Err(LoginError::MissingName) } else { Ok(User::student(name)) }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn teacher_needs_the_passphrase() {
    let gate = PassphraseGate::new("invisible");
    assert_eq!(gate.authenticate(Role::Teacher, "", "invisible"), Ok(User::teacher()));
    assert_eq!(gate.authenticate(Role::Teacher, "Teacher", "visible"), Err(LoginError::IncorrectPassword));
  }

  #[test]
  fn student_name_is_trimmed_and_required() {
    let gate = PassphraseGate::new("invisible");
    assert_eq!(gate.authenticate(Role::Student, "  Bond ", ""), Ok(User::student("Bond")));
    assert_eq!(gate.authenticate(Role::Student, " \t", "invisible"), Err(LoginError::MissingName));
  }
}
