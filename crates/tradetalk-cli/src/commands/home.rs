use crate::output::{HomeView, View};

use super::CommandOutput;

pub fn home() -> CommandOutput {
    CommandOutput::new(View::Home(HomeView::default()), Vec::new())
}
