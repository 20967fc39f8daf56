mod reconciler;
mod view;

pub use {
    reconciler::{Observation, Reconciler},
    view::{DisplayChange, DisplayedState, MixerView},
};
