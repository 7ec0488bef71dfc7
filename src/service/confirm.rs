use std::fmt;
use std::future::Future;
use std::pin::Pin;

use rfd::{AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel};

pub type ConfirmFuture = Pin<Box<dyn Future<Output = bool> + Send + 'static>>;

/// Asks the user to approve a destructive action.
pub trait Confirm: fmt::Debug + Send + Sync {
    fn confirm(&self, title: String, description: String) -> ConfirmFuture;
}

/// Native yes/no dialog.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogConfirm;

impl Confirm for DialogConfirm {
    fn confirm(&self, title: String, description: String) -> ConfirmFuture {
        Box::pin(async move {
            let answer = AsyncMessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title(title)
                .set_description(description)
                .set_buttons(MessageButtons::YesNo)
                .show()
                .await;
            matches!(answer, MessageDialogResult::Yes)
        })
    }
}

/// Always gives the same answer.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirm(pub bool);

#[cfg(test)]
impl Confirm for FixedConfirm {
    fn confirm(&self, _title: String, _description: String) -> ConfirmFuture {
        let answer = self.0;
        Box::pin(async move { answer })
    }
}
