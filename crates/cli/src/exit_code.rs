// crates/cli/src/exit_code.rs

/// Process exit statuses of the `stress-daemon` binary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ExitCode {
    Ok = 0,
    InstanceFailed = 1,
    SyntaxOrUsage = 2,
    Io = 3,
}

impl From<ExitCode> for u8 {
    fn from(code: ExitCode) -> Self {
        code as u8
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        i32::from(u8::from(code))
    }
}

pub fn exit_code_from_error_kind(kind: clap::error::ErrorKind) -> ExitCode {
    use clap::error::ErrorKind::*;
    match kind {
        DisplayHelp | DisplayVersion => ExitCode::Ok,
        Io | Format => ExitCode::Io,
        _ => ExitCode::SyntaxOrUsage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind::*;

    #[test]
    fn maps_error_kinds_to_exit_codes() {
        let cases = [
            (InvalidValue, ExitCode::SyntaxOrUsage),
            (UnknownArgument, ExitCode::SyntaxOrUsage),
            (ValueValidation, ExitCode::SyntaxOrUsage),
            (ArgumentConflict, ExitCode::SyntaxOrUsage),
            (MissingRequiredArgument, ExitCode::SyntaxOrUsage),
            (DisplayHelp, ExitCode::Ok),
            (DisplayVersion, ExitCode::Ok),
            (Io, ExitCode::Io),
            (Format, ExitCode::Io),
        ];
        for (kind, expected) in cases {
            assert_eq!(exit_code_from_error_kind(kind), expected);
        }
    }

    #[test]
    fn numeric_values() {
        assert_eq!(i32::from(ExitCode::Ok), 0);
        assert_eq!(i32::from(ExitCode::InstanceFailed), 1);
        assert_eq!(u8::from(ExitCode::SyntaxOrUsage), 2);
        assert_eq!(u8::from(ExitCode::Io), 3);
    }
}
