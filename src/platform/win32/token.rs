#![allow(unsafe_code)]

use windows::{
    core::BOOL,
    Win32::{
        Security::{
            AllocateAndInitializeSid, CheckTokenMembership, FreeSid, PSID,
            SECURITY_NT_AUTHORITY,
        },
        System::SystemServices::{DOMAIN_ALIAS_RID_ADMINS, SECURITY_BUILTIN_DOMAIN_RID},
    },
};

/// Owns a SID from `AllocateAndInitializeSid`; freed on drop.
struct SidGuard(PSID);

impl Drop for SidGuard {
    fn drop(&mut self) {
        // SAFETY: the SID was allocated by AllocateAndInitializeSid and is
        // freed exactly once, here.
        unsafe {
            let _ = FreeSid(self.0);
        }
    }
}

/// Whether the calling thread's token is a member of BUILTIN\Administrators.
/// `Err` carries the failing call and its native message.
pub(crate) fn is_admin_member() -> Result<bool, String> {
    let mut sid = PSID::default();

    // SAFETY: `sid` is a valid out-pointer; on success it receives a SID that
    // SidGuard releases.
    unsafe {
        AllocateAndInitializeSid(
            &SECURITY_NT_AUTHORITY,
            2,
            SECURITY_BUILTIN_DOMAIN_RID,
            DOMAIN_ALIAS_RID_ADMINS,
            0,
            0,
            0,
            0,
            0,
            0,
            &mut sid,
        )
    }
    .map_err(|e| native_failure("AllocateAndInitializeSid", e))?;
    let sid = SidGuard(sid);

    let mut is_member = BOOL::default();
    // SAFETY: a `None` token means "the calling thread's effective token";
    // `sid.0` stays valid until `sid` drops at the end of this function.
    unsafe { CheckTokenMembership(None, sid.0, &mut is_member) }
        .map_err(|e| native_failure("CheckTokenMembership", e))?;

    Ok(is_member.as_bool())
}

fn native_failure(function: &str, e: windows::core::Error) -> String {
    format!("{function} failed: {}", e.message())
}
