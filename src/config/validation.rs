use super::schema::Settings;

/// Validate game settings before any score is settled.
/// Returns all validation errors at once (not just the first).
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if settings.base_point <= 0 {
        errors.push("settings.base_point: must be positive".to_string());
    }

    if settings.return_point <= 0 {
        errors.push("settings.return_point: must be positive".to_string());
    }

    if !settings.exchange_rate.is_finite() || settings.exchange_rate <= 0.0 {
        errors.push(format!(
            "settings.exchange_rate: must be a positive number, got {}",
            settings.exchange_rate
        ));
    }

    if !settings.table_fee.is_finite() || settings.table_fee < 0.0 {
        errors.push(format!(
            "settings.table_fee: must be non-negative, got {}",
            settings.table_fee
        ));
    }

    let player_count = settings.player_count();
    check_bonus(
        &mut errors,
        "settings.rank_bonus",
        &settings.rank_bonus,
        player_count,
    );

    // Conditional schedules only ever apply to 3 players
    if let Some(ref below) = settings.conditional_bonus_below_30k {
        check_bonus(&mut errors, "settings.conditional_bonus_below_30k", below, 3);
    }
    if let Some(ref above) = settings.conditional_bonus_above_30k {
        check_bonus(&mut errors, "settings.conditional_bonus_above_30k", above, 3);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_bonus(errors: &mut Vec<String>, field: &str, bonus: &[f64], expected_len: usize) {
    if bonus.len() != expected_len {
        errors.push(format!(
            "{}: expected {} entries, got {}",
            field,
            expected_len,
            bonus.len()
        ));
    }
    for (i, value) in bonus.iter().enumerate() {
        if !value.is_finite() {
            errors.push(format!("{}[{}]: invalid value {}", field, i, value));
        }
    }
}
