use colored::Colorize;

use crate::config::{Profile, SyncConfig, redact};

fn print_profile(profile: &Profile) {
    println!("[{}]", profile.name.to_string().cyan());
    println!("  {}: {}", "URL".cyan(), profile.base_url);
    println!("  {}: {}", "Token".cyan(), redact(profile.token()));
}

pub fn show(config: &SyncConfig) {
    print_profile(&config.source);
    print_profile(&config.dest);

    let s = &config.settings;
    println!("[{}]", "sync".cyan());
    println!("  {}: {}", "Update policy".cyan(), s.update_policy);
    println!(
        "  {}: {}",
        "Two-step directive create".cyan(),
        s.directive_two_step_create
    );
    println!("  {}: {}", "Group root category".cyan(), s.group_root_category);
    println!("  {}: {}", "Accept invalid certs".cyan(), s.accept_invalid_certs);
    println!("  {}: {}s", "Timeout".cyan(), s.timeout_secs);
    println!("  {}: {}", "Exclude system objects".cyan(), s.exclude_system);
}
