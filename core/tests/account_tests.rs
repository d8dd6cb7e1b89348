use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use chatsphere_core::commands::guarded;
use chatsphere_core::config::ClientConfig;
use chatsphere_core::error::{Alert, CoreError};
use chatsphere_core::identity::{AccountService, IdentityBackend, ProfileDraft};
use chatsphere_core::media::ImageHost;
use chatsphere_core::models::{FileDescriptor, Profile, ProfileFields};
use tempfile::tempdir;

#[derive(Default)]
struct FakeBackend {
    profiles: RefCell<HashMap<String, Profile>>,
    writes: RefCell<Vec<ProfileFields>>,
    reject_sign_in: bool,
}

impl IdentityBackend for FakeBackend {
    fn sign_in(&self, email: &str, _password: &str) -> Result<String, CoreError> {
        if self.reject_sign_in {
            return Err(CoreError::External("auth/wrong-password".to_string()));
        }
        Ok(format!("uid-{}", email))
    }

    fn sign_up(&self, email: &str, _password: &str) -> Result<String, CoreError> {
        Ok(format!("uid-{}", email))
    }

    fn send_password_reset(&self, _email: &str) -> Result<(), CoreError> {
        Ok(())
    }

    fn read_profile(&self, user_id: &str) -> Result<Option<Profile>, CoreError> {
        Ok(self.profiles.borrow().get(user_id).cloned())
    }

    fn write_profile(&self, user_id: &str, fields: &ProfileFields) -> Result<(), CoreError> {
        self.writes.borrow_mut().push(fields.clone());
        let mut profiles = self.profiles.borrow_mut();
        let profile = profiles.entry(user_id.to_string()).or_default();
        if let Some(username) = &fields.username {
            profile.username = username.clone();
        }
        if let Some(bio) = &fields.bio {
            profile.bio = bio.clone();
        }
        profile.photo_url = fields.photo_url.clone();
        if let Some(email) = &fields.email {
            profile.email = Some(email.clone());
        }
        Ok(())
    }

    fn sign_out(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

struct FakeHost {
    fail: bool,
}

impl ImageHost for FakeHost {
    fn upload(&self, image: &FileDescriptor) -> Result<String, CoreError> {
        if self.fail {
            return Err(CoreError::External("upload rejected".to_string()));
        }
        let name = image.uri.rsplit('/').next().unwrap_or("img");
        Ok(format!("https://i.example/{}", name))
    }
}

fn service(fail_upload: bool) -> AccountService<FakeBackend, FakeHost> {
    AccountService::new(
        FakeBackend::default(),
        FakeHost { fail: fail_upload },
        ClientConfig::default(),
    )
}

#[test]
fn sign_up_writes_profile_with_uploaded_avatar() {
    let accounts = service(false);
    let avatar = FileDescriptor::from_uri("file:///cache/me.jpg");
    let uid = accounts
        .sign_up("zara", " zara@example.com ", "secret", Some(&avatar))
        .expect("sign up");
    assert_eq!(uid, "uid-zara@example.com");

    let profile = accounts.load_profile(&uid).expect("profile");
    assert_eq!(profile.username, "zara");
    assert_eq!(profile.bio, "Hey there! I'm using ChatSphere.");
    assert_eq!(profile.photo_url.as_deref(), Some("https://i.example/me.jpg"));
    assert_eq!(profile.email.as_deref(), Some("zara@example.com"));
}

#[test]
fn failed_avatar_upload_still_signs_up() {
    let accounts = service(true);
    let avatar = FileDescriptor::from_uri("file:///cache/me.jpg");
    let uid = accounts
        .sign_up("zara", "zara@example.com", "secret", Some(&avatar))
        .expect("sign up");
    assert_eq!(accounts.load_profile(&uid).expect("profile").photo_url, None);
}

#[test]
fn invalid_forms_never_reach_backend() {
    let accounts = service(false);
    assert!(accounts.sign_in("", "pw").is_err());
    assert!(accounts.sign_up("zara", "zara-at-example", "pw", None).is_err());
    assert!(accounts.send_password_reset("   ").is_err());
    assert!(accounts.backend().writes.borrow().is_empty());
}

#[test]
fn unknown_user_loads_defaults() {
    let accounts = service(false);
    let profile = accounts.load_profile("nobody").expect("profile");
    assert_eq!(profile.username, "");
    assert_eq!(profile.bio, "Hey there! I'm using ChatSphere.");
}

#[test]
fn unchanged_draft_is_rejected() {
    let accounts = service(false);
    let saved = Profile {
        username: "zara".to_string(),
        bio: "hi".to_string(),
        photo_url: Some("https://i.example/a.jpg".to_string()),
        email: None,
    };
    let draft = ProfileDraft::from_profile(&saved);
    let err = accounts.save_profile("u1", &saved, &draft).unwrap_err();
    assert_eq!(Alert::from(&err), Alert::new("No Changes", "No updates to save."));
    assert!(accounts.backend().writes.borrow().is_empty());
}

#[test]
fn changed_photo_is_uploaded_before_save() {
    let accounts = service(false);
    let saved = Profile {
        username: "zara".to_string(),
        bio: "hi".to_string(),
        photo_url: Some("https://i.example/a.jpg".to_string()),
        email: None,
    };
    let mut draft = ProfileDraft::from_profile(&saved);
    draft.photo = Some(FileDescriptor::from_uri("file:///cache/b.jpg"));
    let stored = accounts.save_profile("u1", &saved, &draft).expect("save");
    assert_eq!(stored.photo_url.as_deref(), Some("https://i.example/b.jpg"));

    let bio_only = ProfileDraft {
        bio: "busy".to_string(),
        ..ProfileDraft::from_profile(&stored)
    };
    let stored = accounts.save_profile("u1", &stored, &bio_only).expect("save");
    assert_eq!(stored.photo_url.as_deref(), Some("https://i.example/b.jpg"));
    assert_eq!(accounts.backend().writes.borrow().len(), 2);
}

#[test]
fn failed_photo_upload_aborts_save() {
    let accounts = service(true);
    let saved = Profile::default();
    let draft = ProfileDraft {
        username: "zara".to_string(),
        bio: String::new(),
        photo: Some(FileDescriptor::from_uri("file:///cache/b.jpg")),
    };
    let err = accounts.save_profile("u1", &saved, &draft).unwrap_err();
    assert_eq!(err.to_string(), "Image upload failed");
    assert!(accounts.backend().writes.borrow().is_empty());
}

#[test]
fn guarded_sign_in_surfaces_provider_message() {
    let dir = tempdir().expect("temp");
    let accounts = AccountService::new(
        FakeBackend {
            reject_sign_in: true,
            ..FakeBackend::default()
        },
        FakeHost { fail: false },
        ClientConfig::default(),
    );
    let alert = guarded(Some(dir.path()), "sign_in", || {
        accounts.sign_in("zara@example.com", "pw")
    })
    .unwrap_err();
    assert_eq!(alert, Alert::new("Error", "auth/wrong-password"));
    let log = fs::read_to_string(dir.path().join("diagnostics.log")).expect("log");
    assert!(log.contains("sign_in_error"));
    assert!(!log.contains("zara@example.com"));
}
