use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::CoreError;
use crate::format::format_bytes;
use crate::models::{FileDescriptor, MessageBody, PermissionStatus};
use crate::timer::{schedule_every, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Camera,
    Gallery,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Cancelled,
    Picked(FileDescriptor),
}

/// Camera, photo library and document picker of the device.
pub trait MediaPicker {
    fn request_permission(&self, kind: PickerKind) -> Result<PermissionStatus, CoreError>;
    fn pick(&self, kind: PickerKind) -> Result<PickOutcome, CoreError>;
}

/// Third-party image hosting. Returns the durable URL of the uploaded image.
pub trait ImageHost {
    fn upload(&self, image: &FileDescriptor) -> Result<String, CoreError>;
}

fn permission_message(kind: PickerKind) -> &'static str {
    match kind {
        PickerKind::Camera => "Camera access is required.",
        PickerKind::Gallery => "Please enable gallery access.",
        PickerKind::Document => "File access is required.",
    }
}

/// Runs the permission check and picker. `Ok(None)` means the user cancelled.
pub fn pick_file<P: MediaPicker + ?Sized>(picker: &P, kind: PickerKind) -> Result<Option<FileDescriptor>, CoreError> {
    if kind != PickerKind::Document && picker.request_permission(kind)? != PermissionStatus::Granted {
        return Err(CoreError::PermissionDenied(permission_message(kind).to_string()));
    }
    match picker.pick(kind)? {
        PickOutcome::Cancelled => {
            debug!(?kind, "picker cancelled");
            Ok(None)
        }
        PickOutcome::Picked(file) => Ok(Some(file)),
    }
}

/// Picks a file and turns it into a message body.
pub fn pick_attachment<P: MediaPicker + ?Sized>(picker: &P, kind: PickerKind) -> Result<Option<MessageBody>, CoreError> {
    Ok(pick_file(picker, kind)?.map(|file| attachment_body(kind, file)))
}

pub fn attachment_body(kind: PickerKind, file: FileDescriptor) -> MessageBody {
    match kind {
        PickerKind::Camera | PickerKind::Gallery => MessageBody::Image { uri: file.uri },
        PickerKind::Document => {
            let name = file
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| file_name_from_uri(&file.uri));
            MessageBody::Document {
                name,
                uri: file.uri,
                size: file.size.unwrap_or(0),
            }
        }
    }
}

fn file_name_from_uri(uri: &str) -> String {
    uri.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("document")
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentIcon {
    Pdf,
    WordProcessor,
    Spreadsheet,
    PlainText,
    Generic,
}

pub fn document_icon(name: &str) -> DocumentIcon {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => DocumentIcon::Pdf,
        Some("doc") | Some("docx") => DocumentIcon::WordProcessor,
        Some("xls") | Some("xlsx") => DocumentIcon::Spreadsheet,
        Some("txt") => DocumentIcon::PlainText,
        _ => DocumentIcon::Generic,
    }
}

pub fn document_size_label(size: u64) -> String {
    format_bytes(size)
}

/// Microphone recording in progress; counts whole seconds while it runs.
pub struct VoiceRecording {
    seconds: Arc<Mutex<u32>>,
    _counter: TimerHandle,
}

impl VoiceRecording {
    /// `microphone` is the answer to the platform's recording permission prompt.
    pub fn start(microphone: PermissionStatus) -> Result<Self, CoreError> {
        if microphone != PermissionStatus::Granted {
            return Err(CoreError::PermissionDenied("Microphone access is required.".to_string()));
        }
        Ok(Self::started())
    }

    fn started() -> Self {
        let seconds = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&seconds);
        let handle = schedule_every(std::time::Duration::from_secs(1), move |_| match counter.lock() {
            Ok(mut guard) => {
                *guard += 1;
                true
            }
            Err(_) => false,
        });
        Self {
            seconds,
            _counter: handle,
        }
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.seconds.lock().map(|g| *g).unwrap_or(0)
    }

    /// Stops the counter and produces the voice-note body for `uri`.
    pub fn finish(self, uri: impl Into<String>) -> Result<MessageBody, CoreError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(CoreError::InvalidArgument("recording has no file".to_string()));
        }
        Ok(MessageBody::VoiceNote {
            uri,
            duration_secs: self.elapsed_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePicker {
        permission: PermissionStatus,
        outcome: PickOutcome,
    }

    impl MediaPicker for FakePicker {
        fn request_permission(&self, _kind: PickerKind) -> Result<PermissionStatus, CoreError> {
            Ok(self.permission)
        }

        fn pick(&self, _kind: PickerKind) -> Result<PickOutcome, CoreError> {
            Ok(self.outcome.clone())
        }
    }

    #[test]
    fn denied_camera_aborts() {
        let picker = FakePicker {
            permission: PermissionStatus::Denied,
            outcome: PickOutcome::Picked(FileDescriptor::from_uri("file:///a.jpg")),
        };
        let err = pick_attachment(&picker, PickerKind::Camera).unwrap_err();
        assert!(matches!(err, CoreError::PermissionDenied(_)));
    }

    #[test]
    fn cancelled_pick_is_none() {
        let picker = FakePicker {
            permission: PermissionStatus::Granted,
            outcome: PickOutcome::Cancelled,
        };
        assert_eq!(pick_attachment(&picker, PickerKind::Gallery).expect("pick"), None);
    }

    #[test]
    fn document_without_name_uses_uri_tail() {
        let body = attachment_body(
            PickerKind::Document,
            FileDescriptor {
                uri: "file:///cache/Notes.txt".to_string(),
                name: None,
                size: Some(2048),
                mime_type_hint: None,
            },
        );
        assert_eq!(
            body,
            MessageBody::Document {
                name: "Notes.txt".to_string(),
                uri: "file:///cache/Notes.txt".to_string(),
                size: 2048,
            }
        );
        assert_eq!(document_icon("Notes.txt"), DocumentIcon::PlainText);
        assert_eq!(document_size_label(2048), "2.0 KB");
    }

    #[test]
    fn document_icons_by_extension() {
        assert_eq!(document_icon("cv.PDF"), DocumentIcon::Pdf);
        assert_eq!(document_icon("plan.xlsx"), DocumentIcon::Spreadsheet);
        assert_eq!(document_icon("archive"), DocumentIcon::Generic);
    }

    #[test]
    fn recording_requires_a_file() {
        assert!(VoiceRecording::start(PermissionStatus::Denied).is_err());
        let recording = VoiceRecording::start(PermissionStatus::Granted).expect("start");
        assert!(recording.finish(" ").is_err());
        let recording = VoiceRecording::started();
        let body = recording.finish("file:///rec.m4a").expect("body");
        assert!(matches!(body, MessageBody::VoiceNote { duration_secs: 0, .. }));
    }
}
