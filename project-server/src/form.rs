use atdto::error_codes::PROJECT_NOT_RUNNING;

use crate::filename::{default_filename, filename_extension, is_only_downloadable, SPECIAL_FILENAMES};

/// What a submit decided, the delegate turns it into runtime calls
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SubmitOutcome {
    /// Empty candidate, the caller re-focuses the input
    NoOp,
    CreateFile { name: String, ext: Option<String> },
    CreateFolder { name: String },
    /// The candidate is a link, the runtime fetches it
    Download { name: String },
    /// No extension, wait for the user to confirm or edit
    NeedsConfirmation,
}

/// State of one "create new file / folder / upload" form.
/// Pure decision machine, every real effect goes through the
/// actions seam owned by the delegate.
#[derive(Debug, Clone)]
pub(crate) struct NewEntryForm {
    pub filename: String,
    pub extension_warning: bool,
    pub downloading: bool,
    pub file_creation_error: Option<String>,
}

impl NewEntryForm {
    /// A form with no candidate name starts on the generated default
    pub fn new(filename: Option<String>, preset_ext: Option<&str>) -> Self {
        let filename = match filename {
            Some(f) => f,
            None => default_filename(preset_ext),
        };
        Self {
            filename,
            extension_warning: false,
            downloading: false,
            file_creation_error: None,
        }
    }

    /// Classify the candidate, in this exact order :
    /// empty, explicit ext or special name, trailing slash, link or
    /// extension, otherwise raise the warning
    pub fn submit(&mut self, ext: Option<&str>) -> SubmitOutcome {
        if self.filename.is_empty() {
            return SubmitOutcome::NoOp;
        }
        if ext.is_some() || SPECIAL_FILENAMES.contains(&self.filename.as_str()) {
            return SubmitOutcome::CreateFile {
                name: self.filename.clone(),
                ext: ext.map(|e| e.to_owned()),
            };
        }
        if self.filename.ends_with('/') {
            return SubmitOutcome::CreateFolder {
                name: self.filename.clone(),
            };
        }
        if is_only_downloadable(&self.filename) {
            self.downloading = true;
            return SubmitOutcome::Download {
                name: self.filename.clone(),
            };
        }
        if !filename_extension(&self.filename).is_empty() {
            return SubmitOutcome::CreateFile {
                name: self.filename.clone(),
                ext: None,
            };
        }
        self.extension_warning = true;
        SubmitOutcome::NeedsConfirmation
    }

    /// "Yes, please create this file with no extension"
    pub fn confirm_anyway(&mut self) -> SubmitOutcome {
        if self.filename.is_empty() {
            return SubmitOutcome::NoOp;
        }
        self.extension_warning = false;
        SubmitOutcome::CreateFile {
            name: self.filename.clone(),
            ext: None,
        }
    }

    /// While the warning is up the first edit only clears it, the
    /// typed value is discarded
    pub fn on_change(&mut self, value: &str) {
        if self.extension_warning {
            self.extension_warning = false;
        } else {
            self.filename = value.to_owned();
        }
    }

    /// True when the keystroke closes the form
    pub fn keystroke(&mut self, key: &str) -> bool {
        key == "Escape"
    }

    pub fn download_done(&mut self) {
        self.downloading = false;
    }

    /// Keep the creation failure for the error banner, the
    /// "not running" case gets the friendly wording
    pub fn set_creation_error(&mut self, error: &str) {
        let message = if error == "not running" {
            PROJECT_NOT_RUNNING.err_message.to_owned()
        } else {
            error.to_owned()
        };
        self.file_creation_error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.file_creation_error = None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    #[test]
    fn empty_candidate_is_a_noop() {
        let mut form = NewEntryForm::new(Some("".to_owned()), None);
        assert_eq!(SubmitOutcome::NoOp, form.submit(None));
        assert!(!form.extension_warning);
    }

    #[test]
    fn explicit_ext_wins_over_everything() {
        let mut form = NewEntryForm::new(Some("analysis".to_owned()), None);
        assert_eq!(
            SubmitOutcome::CreateFile {
                name: "analysis".to_owned(),
                ext: Some("ipynb".to_owned())
            },
            form.submit(Some("ipynb"))
        );
    }

    #[test]
    fn special_name_is_a_file_without_extension() {
        let mut form = NewEntryForm::new(Some("Dockerfile".to_owned()), None);
        assert_eq!(
            SubmitOutcome::CreateFile {
                name: "Dockerfile".to_owned(),
                ext: None
            },
            form.submit(None)
        );
    }

    #[test]
    fn trailing_slash_is_a_folder() {
        let mut form = NewEntryForm::new(Some("data/".to_owned()), None);
        assert_eq!(
            SubmitOutcome::CreateFolder {
                name: "data/".to_owned()
            },
            form.submit(None)
        );
    }

    #[test]
    fn recognized_extension_is_a_file() {
        let mut form = NewEntryForm::new(Some("notes.md".to_owned()), None);
        assert_eq!(
            SubmitOutcome::CreateFile {
                name: "notes.md".to_owned(),
                ext: None
            },
            form.submit(None)
        );
    }

    #[test]
    fn link_is_a_download() {
        let mut form = NewEntryForm::new(Some("https://example.com/data.csv".to_owned()), None);
        assert_eq!(
            SubmitOutcome::Download {
                name: "https://example.com/data.csv".to_owned()
            },
            form.submit(None)
        );
        assert!(form.downloading);
        form.download_done();
        assert!(!form.downloading);
    }

    #[test]
    fn no_extension_raises_the_warning() {
        let mut form = NewEntryForm::new(Some("notes".to_owned()), None);
        assert_eq!(SubmitOutcome::NeedsConfirmation, form.submit(None));
        assert!(form.extension_warning);

        // trailing dot counts as no extension
        let mut form = NewEntryForm::new(Some("foo.".to_owned()), None);
        assert_eq!(SubmitOutcome::NeedsConfirmation, form.submit(None));
    }

    #[test]
    fn dotfile_does_not_raise_the_warning() {
        let mut form = NewEntryForm::new(Some(".bashrc".to_owned()), None);
        assert_eq!(
            SubmitOutcome::CreateFile {
                name: ".bashrc".to_owned(),
                ext: None
            },
            form.submit(None)
        );
    }

    #[test]
    fn confirm_creates_the_file_anyway() {
        let mut form = NewEntryForm::new(Some("notes".to_owned()), None);
        let _ = form.submit(None);
        assert!(form.extension_warning);
        assert_eq!(
            SubmitOutcome::CreateFile {
                name: "notes".to_owned(),
                ext: None
            },
            form.confirm_anyway()
        );
        assert!(!form.extension_warning);
    }

    #[test]
    fn first_edit_under_warning_only_clears_it() {
        let mut form = NewEntryForm::new(Some("notes".to_owned()), None);
        let _ = form.submit(None);

        form.on_change("notes2");
        assert!(!form.extension_warning);
        assert_eq!("notes", form.filename);

        form.on_change("notes2");
        assert_eq!("notes2", form.filename);
    }

    #[test]
    fn escape_closes_the_form() {
        let mut form = NewEntryForm::new(None, None);
        assert!(form.keystroke("Escape"));
        assert!(!form.keystroke("Enter"));
    }

    #[test]
    fn not_running_gets_the_friendly_wording() {
        let mut form = NewEntryForm::new(None, None);
        form.set_creation_error("not running");
        assert_eq!(
            Some("The project is not running. Please try again in a moment".to_owned()),
            form.file_creation_error
        );

        form.set_creation_error("disk full");
        assert_eq!(Some("disk full".to_owned()), form.file_creation_error);

        form.clear_error();
        assert_eq!(None, form.file_creation_error);
    }

    #[test]
    fn missing_candidate_is_seeded_with_the_default() {
        let form = NewEntryForm::new(None, None);
        assert!(NaiveDateTime::parse_from_str(&form.filename, "%Y-%m-%d-%H%M%S").is_ok());

        let form = NewEntryForm::new(None, Some("tex"));
        assert!(form.filename.ends_with(".tex"));
    }
}
