//! `landrail abi`: Report the kernel's Landlock support.

use anyhow::Context;
use clap::Args;
use landrail_common::types::AbiVersion;
use landrail_core::mask;

use crate::output::format_flags;

/// Arguments for the `abi` command.
#[derive(Args, Debug)]
pub struct AbiArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `abi` command.
///
/// # Errors
///
/// Returns an error if the kernel cannot be probed.
#[allow(clippy::print_stdout)]
pub fn execute(args: &AbiArgs) -> anyhow::Result<()> {
    let abi = landrail_core::abi_version().context("failed to query the Landlock ABI version")?;
    let errata = landrail_core::errata().context("failed to query the Landlock errata")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report_json(abi, errata))?);
    } else {
        println!("ABI version:   {abi}");
        println!("Errata:        {errata:#x}");
        println!("Filesystem:    {}", format_flags(&mask::supported_fs(abi)));
        println!("Network:       {}", format_flags(&mask::supported_net(abi)));
        println!("Scope:         {}", format_flags(&mask::supported_scope(abi)));
        println!("Restrict-self: {}", format_flags(&mask::supported_restrict_flags(abi)));
    }
    Ok(())
}

fn report_json(abi: AbiVersion, errata: u32) -> serde_json::Value {
    serde_json::json!({
        "abi": abi,
        "errata": errata,
        "filesystem": mask::supported_fs(abi),
        "network": mask::supported_net(abi),
        "scope": mask::supported_scope(abi),
        "restrict_flags": mask::supported_restrict_flags(abi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_report_uses_textual_rights() {
        let report = report_json(AbiVersion::V4, 1);
        assert_eq!(report["abi"], 4);
        assert_eq!(report["errata"], 1);
        assert_eq!(report["network"], "BIND_TCP | CONNECT_TCP");
        assert_eq!(report["scope"], "");
    }
}
