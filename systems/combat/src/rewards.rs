use horde_core::{Event, HostileDescriptor, Vec2};
use rand::Rng;

/// Rewards paid out for one kill.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reward {
    /// Experience granted after the player's multiplier.
    pub experience: f32,
    /// Gold dropped at the kill position, if the drop roll succeeded.
    pub gold: Option<u32>,
}

/// Rolls the rewards of a dead hostile.
///
/// Experience is always granted. Gold drops independently with the
/// descriptor's chance and an amount uniform in `[min_gold, max_gold]`.
pub fn payout<R: Rng + ?Sized>(
    descriptor: &HostileDescriptor,
    exp_multiplier: f32,
    position: Vec2,
    rng: &mut R,
    out: &mut Vec<Event>,
) -> Reward {
    let experience = descriptor.exp_reward * exp_multiplier;
    if experience > 0.0 {
        out.push(Event::ExperienceGained { amount: experience });
    }

    let gold = if rng.gen::<f32>() < descriptor.gold_drop_chance {
        let low = descriptor.min_gold.min(descriptor.max_gold);
        let amount = rng.gen_range(low..=descriptor.max_gold);
        (amount > 0).then_some(amount)
    } else {
        None
    };
    if let Some(amount) = gold {
        out.push(Event::GoldDropped { position, amount });
    }

    Reward { experience, gold }
}
