//! C ABI boundary for host applications.
//!
//! Hosts hold identities through opaque owning pointers and never see
//! the Rust types. Every operation reports failure locally (null
//! pointer, zero count, or false) and nothing unwinds across the
//! boundary: generation and parsing are wrapped so a fault in a
//! primitive turns into a null handle.

use std::ffi::{c_char, c_int, c_uint, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use crate::identity::{
    Identity, IdentityType, FINGERPRINT_HASH_SIZE, IDENTITY_STRING_SIZE_MAX,
};

/// Capacity a caller must provide to `trellis_identity_sign`.
pub const TRELLIS_SIGNATURE_BUFFER_SIZE: usize = crate::identity::SIGNATURE_BUFFER_SIZE;

/// Capacity a caller must provide to `trellis_identity_to_string`.
pub const TRELLIS_IDENTITY_STRING_BUFFER_LENGTH: usize = IDENTITY_STRING_SIZE_MAX;

/// Borrowed fingerprint view returned by `trellis_identity_fingerprint`.
///
/// Valid for the lifetime of the handle it was obtained from.
#[repr(C)]
pub struct TrellisFingerprint {
    pub address: u64,
    pub hash: [u8; FINGERPRINT_HASH_SIZE],
}

/// Opaque identity handle.
pub struct TrellisIdentity {
    identity: Identity,
    fingerprint: TrellisFingerprint,
}

impl TrellisIdentity {
    fn boxed(identity: Identity) -> *mut Self {
        let fingerprint = TrellisFingerprint {
            address: identity.address().to_u64(),
            hash: *identity.fingerprint().hash(),
        };
        Box::into_raw(Box::new(Self { identity, fingerprint }))
    }
}

/// Generate a new identity of the given type.
///
/// Blocks for the duration of the proof-of-work grind. Returns null
/// for an unknown type or on any internal failure.
#[no_mangle]
pub extern "C" fn trellis_identity_new(kind: c_int) -> *mut TrellisIdentity {
    let kind = match u8::try_from(kind).ok().and_then(|b| IdentityType::from_wire(b).ok()) {
        Some(kind) => kind,
        None => return ptr::null_mut(),
    };
    match catch_unwind(AssertUnwindSafe(|| Identity::generate(kind))) {
        Ok(Ok(identity)) => TrellisIdentity::boxed(identity),
        _ => ptr::null_mut(),
    }
}

/// Parse an identity from its NUL-terminated text form.
#[no_mangle]
pub extern "C" fn trellis_identity_from_string(s: *const c_char) -> *mut TrellisIdentity {
    if s.is_null() {
        return ptr::null_mut();
    }
    let Ok(s) = unsafe { CStr::from_ptr(s) }.to_str() else {
        return ptr::null_mut();
    };
    match catch_unwind(|| s.parse::<Identity>()) {
        Ok(Ok(identity)) => TrellisIdentity::boxed(identity),
        _ => ptr::null_mut(),
    }
}

/// Recompute the proof of work and address binding. Returns 1 when
/// the identity is valid.
#[no_mangle]
pub extern "C" fn trellis_identity_validate(id: *const TrellisIdentity) -> c_int {
    let Some(handle) = (unsafe { id.as_ref() }) else {
        return 0;
    };
    handle.identity.validate().into()
}

/// Sign `data`, writing the signature into `sig`.
///
/// Returns the number of signature bytes written, or 0 when the
/// buffer is smaller than the identity type's signature, the identity
/// has no secret key, or any argument is null.
#[no_mangle]
pub extern "C" fn trellis_identity_sign(
    id: *const TrellisIdentity,
    data: *const u8,
    len: c_uint,
    sig: *mut u8,
    sig_capacity: c_uint,
) -> c_uint {
    let Some(handle) = (unsafe { id.as_ref() }) else {
        return 0;
    };
    if (data.is_null() && len > 0) || sig.is_null() {
        return 0;
    }
    let needed = handle.identity.identity_type().signature_size();
    if (sig_capacity as usize) < needed {
        return 0;
    }
    let data = unsafe { std::slice::from_raw_parts(data, len as usize) };
    match handle.identity.sign(data) {
        Ok(signature) => {
            let bytes = signature.as_bytes();
            unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), sig, bytes.len()) };
            bytes.len() as c_uint
        }
        Err(_) => 0,
    }
}

/// Verify a signature over `data`. Returns 1 on success.
#[no_mangle]
pub extern "C" fn trellis_identity_verify(
    id: *const TrellisIdentity,
    data: *const u8,
    len: c_uint,
    sig: *const u8,
    sig_len: c_uint,
) -> c_int {
    let Some(handle) = (unsafe { id.as_ref() }) else {
        return 0;
    };
    if (data.is_null() && len > 0) || sig.is_null() || sig_len == 0 {
        return 0;
    }
    let data = unsafe { std::slice::from_raw_parts(data, len as usize) };
    let sig = unsafe { std::slice::from_raw_parts(sig, sig_len as usize) };
    handle.identity.verify(data, sig).into()
}

/// The identity's type tag (0 or 1), or -1 for a null handle.
#[no_mangle]
pub extern "C" fn trellis_identity_type(id: *const TrellisIdentity) -> c_int {
    match unsafe { id.as_ref() } {
        Some(handle) => handle.identity.identity_type() as c_int,
        None => -1,
    }
}

/// Render the NUL-terminated text form into `buf`.
///
/// `capacity` must be at least `TRELLIS_IDENTITY_STRING_BUFFER_LENGTH`.
/// Returns `buf`, or null on failure.
#[no_mangle]
pub extern "C" fn trellis_identity_to_string(
    id: *const TrellisIdentity,
    buf: *mut c_char,
    capacity: c_int,
    include_private: c_int,
) -> *mut c_char {
    let Some(handle) = (unsafe { id.as_ref() }) else {
        return ptr::null_mut();
    };
    if buf.is_null() || (capacity as usize) < TRELLIS_IDENTITY_STRING_BUFFER_LENGTH {
        return ptr::null_mut();
    }
    let s = handle.identity.to_string_with_private(include_private != 0);
    unsafe {
        ptr::copy_nonoverlapping(s.as_ptr(), buf as *mut u8, s.len());
        *buf.add(s.len()) = 0;
    }
    buf
}

/// Whether the identity carries its secret key. Returns 0 or 1.
#[no_mangle]
pub extern "C" fn trellis_identity_has_private(id: *const TrellisIdentity) -> c_int {
    match unsafe { id.as_ref() } {
        Some(handle) => handle.identity.has_private().into(),
        None => 0,
    }
}

/// The identity's 40-bit address in the low bits of a 64-bit integer.
#[no_mangle]
pub extern "C" fn trellis_identity_address(id: *const TrellisIdentity) -> u64 {
    match unsafe { id.as_ref() } {
        Some(handle) => handle.identity.address().to_u64(),
        None => 0,
    }
}

/// Borrow the identity's fingerprint. The pointer is owned by the
/// handle and is valid until `trellis_identity_delete`.
#[no_mangle]
pub extern "C" fn trellis_identity_fingerprint(
    id: *const TrellisIdentity,
) -> *const TrellisFingerprint {
    match unsafe { id.as_ref() } {
        Some(handle) => &handle.fingerprint,
        None => ptr::null(),
    }
}

/// Destroy a handle, zeroizing any secret material it held.
#[no_mangle]
pub extern "C" fn trellis_identity_delete(id: *mut TrellisIdentity) {
    if !id.is_null() {
        drop(unsafe { Box::from_raw(id) });
    }
}
