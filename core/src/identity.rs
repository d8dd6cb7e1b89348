use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::media::ImageHost;
use crate::models::{FileDescriptor, Profile, ProfileFields};
use crate::timer::{schedule_every, TimerHandle};

const MIN_PHONE_DIGITS: usize = 11;
const OTP_LEN: usize = 6;
const OTP_RESEND_SECS: u32 = 60;

/// Hosted identity provider and profile document store.
pub trait IdentityBackend {
    /// Returns the signed-in user id.
    fn sign_in(&self, email: &str, password: &str) -> Result<String, CoreError>;
    /// Creates the account and returns its user id.
    fn sign_up(&self, email: &str, password: &str) -> Result<String, CoreError>;
    fn send_password_reset(&self, email: &str) -> Result<(), CoreError>;
    fn read_profile(&self, user_id: &str) -> Result<Option<Profile>, CoreError>;
    fn write_profile(&self, user_id: &str, fields: &ProfileFields) -> Result<(), CoreError>;
    fn sign_out(&self) -> Result<(), CoreError>;
}

/// Accepts `local@domain.tld` with no whitespace.
// Same shape as `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn validate_sign_in(email: &str, password: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CoreError::Validation("Please enter both email and password.".to_string()));
    }
    Ok(())
}

pub fn validate_sign_up(username: &str, email: &str, password: &str) -> Result<(), CoreError> {
    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(CoreError::Validation("Please fill out all fields.".to_string()));
    }
    if !is_valid_email(email.trim()) {
        return Err(CoreError::Validation("Please enter a valid email address.".to_string()));
    }
    Ok(())
}

/// Returns the phone digits when at least 11 are present.
pub fn validate_phone_number(raw: &str) -> Result<String, CoreError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(CoreError::Validation(
            "Please enter a valid phone number with at least 11 digits.".to_string(),
        ));
    }
    Ok(digits)
}

/// One-time code typed into the verification screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let code = raw.trim();
        if code.len() != OTP_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::Validation("Enter the 6-digit code.".to_string()));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Countdown gating "Resend Code" on the verification screen.
pub struct OtpResendTimer {
    remaining: Arc<AtomicU32>,
    tick: Duration,
    _countdown: TimerHandle,
}

impl OtpResendTimer {
    pub fn start() -> Self {
        Self::with_tick(Duration::from_secs(1))
    }

    fn with_tick(tick: Duration) -> Self {
        let remaining = Arc::new(AtomicU32::new(OTP_RESEND_SECS));
        let countdown = start_countdown(Arc::clone(&remaining), tick);
        Self {
            remaining,
            tick,
            _countdown: countdown,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn can_resend(&self) -> bool {
        self.remaining_secs() == 0
    }

    pub fn label(&self) -> String {
        match self.remaining_secs() {
            0 => "Resend Code".to_string(),
            secs => format!("Resend in {}s", secs),
        }
    }

    /// Restarts the countdown. Refused while it is still running.
    pub fn resend(&mut self) -> Result<(), CoreError> {
        let secs = self.remaining_secs();
        if secs > 0 {
            return Err(CoreError::Validation(format!("Resend in {}s", secs)));
        }
        self.remaining.store(OTP_RESEND_SECS, Ordering::Release);
        self._countdown = start_countdown(Arc::clone(&self.remaining), self.tick);
        info!("verification code resent");
        Ok(())
    }
}

fn start_countdown(remaining: Arc<AtomicU32>, tick: Duration) -> TimerHandle {
    schedule_every(tick, move |_| {
        let left = remaining.load(Ordering::Acquire).saturating_sub(1);
        remaining.store(left, Ordering::Release);
        left > 0
    })
}

/// Editable copy of the profile on the settings screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub username: String,
    pub bio: String,
    pub photo: Option<FileDescriptor>,
}

impl ProfileDraft {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            bio: profile.bio.clone(),
            photo: profile.photo_url.clone().map(FileDescriptor::from_uri),
        }
    }

    fn photo_changed(&self, saved: &Profile) -> bool {
        self.photo.as_ref().map(|p| p.uri.as_str()) != saved.photo_url.as_deref()
    }

    pub fn has_changes(&self, saved: &Profile) -> bool {
        self.username != saved.username || self.bio != saved.bio || self.photo_changed(saved)
    }
}

pub struct AccountService<B, H> {
    backend: B,
    images: H,
    config: ClientConfig,
}

impl<B: IdentityBackend, H: ImageHost> AccountService<B, H> {
    pub fn new(backend: B, images: H, config: ClientConfig) -> Self {
        Self { backend, images, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<String, CoreError> {
        validate_sign_in(email, password)?;
        let user_id = self.backend.sign_in(email.trim(), password)?;
        info!(%user_id, "signed in");
        Ok(user_id)
    }

    /// Creates the account, uploads the optional avatar and writes the profile document.
    /// A failed avatar upload leaves the photo empty instead of failing sign-up.
    pub fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
        avatar: Option<&FileDescriptor>,
    ) -> Result<String, CoreError> {
        validate_sign_up(username, email, password)?;
        let email = email.trim();
        let user_id = self.backend.sign_up(email, password)?;
        let photo_url = match avatar {
            Some(file) => match self.images.upload(file) {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!(error = %err, "avatar upload failed during sign-up");
                    None
                }
            },
            None => None,
        };
        self.backend.write_profile(
            &user_id,
            &ProfileFields {
                username: Some(username.trim().to_string()),
                bio: Some(self.config.default_bio.clone()),
                photo_url,
                email: Some(email.to_string()),
            },
        )?;
        Ok(user_id)
    }

    pub fn send_password_reset(&self, email: &str) -> Result<(), CoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CoreError::Validation("Please enter your email address.".to_string()));
        }
        self.backend.send_password_reset(email)
    }

    pub fn load_profile(&self, user_id: &str) -> Result<Profile, CoreError> {
        let mut profile = self.backend.read_profile(user_id)?.unwrap_or_default();
        if profile.bio.is_empty() {
            profile.bio = self.config.default_bio.clone();
        }
        Ok(profile)
    }

    /// Saves `draft`, uploading a changed photo first. Returns the stored profile.
    pub fn save_profile(&self, user_id: &str, saved: &Profile, draft: &ProfileDraft) -> Result<Profile, CoreError> {
        if !draft.has_changes(saved) {
            return Err(CoreError::NoChanges);
        }
        let photo_url = match &draft.photo {
            Some(file) if draft.photo_changed(saved) => Some(
                self.images
                    .upload(file)
                    .map_err(|_| CoreError::External("Image upload failed".to_string()))?,
            ),
            Some(_) => saved.photo_url.clone(),
            None => None,
        };
        let fields = ProfileFields {
            username: Some(draft.username.clone()),
            bio: Some(draft.bio.clone()),
            photo_url: photo_url.clone(),
            email: None,
        };
        self.backend.write_profile(user_id, &fields)?;
        Ok(Profile {
            username: draft.username.clone(),
            bio: draft.bio.clone(),
            photo_url,
            email: saved.email.clone(),
        })
    }

    pub fn sign_out(&self) -> Result<(), CoreError> {
        self.backend.sign_out()
    }
}
