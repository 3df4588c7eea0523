use std::path::Path;
use tunnelkit_core::domain::ComputeModule;

#[derive(Debug, Clone, Copy)]
pub(super) struct ModuleCommandSpec {
    pub(super) command: &'static str,
    /// Standalone executable name that implies this subcommand.
    pub(super) program_alias: &'static str,
}

pub(super) const MODULE_COMMANDS: [ModuleCommandSpec; 5] = [
    ModuleCommandSpec {
        command: "poles",
        program_alias: "ab-shape-res",
    },
    ModuleCommandSpec {
        command: "barrier",
        program_alias: "barrier-1d-wkb",
    },
    ModuleCommandSpec {
        command: "washboard",
        program_alias: "washboard-agmon",
    },
    ModuleCommandSpec {
        command: "gap-certificates",
        program_alias: "compute-gap-certificates",
    },
    ModuleCommandSpec {
        command: "checksums",
        program_alias: "make-checksums",
    },
];

/// Order used by `tunnelkit all`; checksums run last so they see fresh tables.
pub(super) const SERIAL_CHAIN_ORDER: [ComputeModule; 5] = [
    ComputeModule::GapCertificates,
    ComputeModule::PoleSearch,
    ComputeModule::Barrier,
    ComputeModule::Washboard,
    ComputeModule::Checksums,
];

pub(super) fn module_command_spec(command: &str) -> Option<ModuleCommandSpec> {
    MODULE_COMMANDS
        .iter()
        .copied()
        .find(|spec| spec.command == command || spec.program_alias == command)
}

pub(super) fn command_alias_from_program_name(program_name: &str) -> Option<&'static str> {
    let executable_name = Path::new(program_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program_name);
    let normalized = executable_name
        .strip_suffix(".exe")
        .unwrap_or(executable_name);

    if normalized == "tunnelkit" {
        return None;
    }

    module_command_spec(normalized).map(|spec| spec.command)
}
