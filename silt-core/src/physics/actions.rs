//! The action pipeline evaluated before a block update's handler.

use silt_utils::random::Random;
use silt_utils::{BlockPos, BlockState};

use super::params::{ActionKind, PhysicsAction};
use super::update::{PendingUpdate, UpdateKind};
use crate::behavior::TickContext;

/// Half-extent of the finite spread neighbourhood.
const FINITE_REACH: i32 = 2;

/// Runs every live action of a block update in order.
///
/// Drop and finite actions move the block and the update's position with
/// it. Returns `true` if at least one action is still live afterwards, in
/// which case the caller re-queues the update.
pub(crate) fn run_actions(ctx: &mut TickContext<'_>, update: &mut PendingUpdate) -> bool {
    let UpdateKind::Block { pos, tick_delay, .. } = &mut update.kind else {
        return false;
    };
    let tick_delay = *tick_delay;
    let elapsed = update.elapsed;

    for action in update.params.slots_mut().iter_mut() {
        match action.kind {
            ActionKind::None => continue,
            ActionKind::Dissipate => dissipate(ctx, *pos, action),
            ActionKind::Drop => {
                if elapsed % drop_stride(action.val, tick_delay) == 0 {
                    drop_once(ctx, pos, action);
                }
            }
            ActionKind::Finite => finite(ctx, pos, action),
        }

        // Expiry counts evaluations, whether or not the action acted
        if action.expire == 0 {
            action.deactivate();
        } else if action.expire > 0 {
            action.expire -= 1;
        }
    }

    !update.params.is_empty()
}

/// Number of cycles between two drop steps.
fn drop_stride(val: i16, tick_delay: i32) -> u32 {
    let per_cycle = 50i32.saturating_mul(tick_delay.max(1));
    (i32::from(val) / per_cycle).max(1).unsigned_abs()
}

fn dissipate(ctx: &mut TickContext<'_>, pos: BlockPos, action: &mut PhysicsAction) {
    if ctx.rng.next_i32_bounded(101) <= i32::from(action.val) {
        ctx.set_block(pos, BlockState::AIR);
        action.deactivate();
    }
}

/// Moves the block down one voxel if there is air below.
fn drop_once(ctx: &TickContext<'_>, pos: &mut BlockPos, action: &mut PhysicsAction) {
    let below = pos.below();
    if ctx.get_block(*pos).is_air() || !ctx.is_air(below) {
        action.deactivate();
        return;
    }
    ctx.move_block(*pos, below);
    *pos = below;
}

/// Falls like drop, otherwise spreads sideways into a nearby hole.
fn finite(ctx: &mut TickContext<'_>, pos: &mut BlockPos, action: &mut PhysicsAction) {
    if ctx.get_block(*pos).is_air() {
        action.deactivate();
        return;
    }
    let below = pos.below();
    if ctx.is_air(below) {
        ctx.move_block(*pos, below);
        *pos = below;
        return;
    }

    let mut offsets = [(0, 0); 25];
    let mut i = 0;
    for dx in -FINITE_REACH..=FINITE_REACH {
        for dz in -FINITE_REACH..=FINITE_REACH {
            offsets[i] = (dx, dz);
            i += 1;
        }
    }
    ctx.rng.shuffle(&mut offsets);

    // Halving truncates towards zero, so every target sits between the
    // source and the sampled offset.
    let target = offsets
        .iter()
        .map(|&(dx, dz)| pos.offset(dx / 2, 0, dz / 2))
        .find(|target| ctx.is_air(*target) && ctx.is_air(target.below()));

    match target {
        Some(target) => {
            ctx.move_block(*pos, target);
            *pos = target;
        }
        None => action.deactivate(),
    }
}
