use serde::Serialize;

/// A telephone calling code offered on the contact step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallingCode {
    pub code: &'static str,
    pub label: &'static str,
}

/// Recognized calling codes, in the order they are offered.
pub const CALLING_CODES: &[CallingCode] = &[
    CallingCode {
        code: "+1",
        label: "+1 (US/CA)",
    },
    CallingCode {
        code: "+44",
        label: "+44 (UK)",
    },
    CallingCode {
        code: "+49",
        label: "+49 (DE)",
    },
    CallingCode {
        code: "+972",
        label: "+972 (IL)",
    },
    CallingCode {
        code: "+61",
        label: "+61 (AU)",
    },
];

pub const DEFAULT_CALLING_CODE: &str = "+1";

pub fn find_calling_code(code: &str) -> Option<&'static CallingCode> {
    let code = code.trim();
    CALLING_CODES.iter().find(|entry| entry.code == code)
}

pub fn is_recognized(code: &str) -> bool {
    find_calling_code(code).is_some()
}
