use {
    herald_abilities::{Ability, AbilityToggle, DefaultAbilities, Localizer, Registry},
    herald_config::HeraldConfig,
};

pub fn list_abilities(config: &HeraldConfig) -> anyhow::Result<()> {
    let defaults = DefaultAbilities::new(
        config.bot.creator_id,
        Localizer::new(config.messages.clone()),
        AbilityToggle::from(&config.abilities),
    );
    let registry = Registry::build(&[&defaults])?;
    if registry.is_empty() {
        println!("No abilities registered.");
        return Ok(());
    }
    for line in ability_lines(&registry) {
        println!("{line}");
    }
    Ok(())
}

fn ability_lines(registry: &Registry) -> Vec<String> {
    let mut abilities: Vec<&Ability> = registry.abilities().iter().collect();
    abilities.sort_by(|a, b| a.name().cmp(b.name()));
    abilities
        .into_iter()
        .map(|ability| {
            let line = format!(
                "  /{:<10} {:<11} {:<6} input={}",
                ability.name(),
                ability.privacy().as_str(),
                ability.locality().as_str(),
                ability.input()
            );
            match ability.info() {
                Some(info) => format!("{line}  {info}"),
                None => line,
            }
        })
        .collect()
}
