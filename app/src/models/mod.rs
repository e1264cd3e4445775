mod gesture;
mod landmark_source;

pub use gesture::{
    classify, extended_fingers, primary_gesture, thumb_extended, Classifier, Gesture, Move,
};
pub use landmark_source::{IpcLandmarkSource, LandmarkFrame, ScriptedSource};

#[cfg(test)]
pub(crate) use gesture::tests::hand_with;
