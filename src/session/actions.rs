//! Actions sent from the display layer to the session

use tracing::debug;

use super::{Session, SessionError};

/// User actions the display layer can trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    /// Open the camera
    StartCapture,
    /// Close the camera without taking a photo
    StopCapture,
    /// Take a still from the camera
    TakePhoto,
    /// Pointer pressed on the focus region
    DragStart,
    /// Pointer moved, relative to the displayed photo
    DragMove { x: f32, y: f32 },
    /// Pointer released
    DragEnd,
    /// Recognize the focus region and look it up
    Process,
    /// Stop waiting for a running recognition
    CancelProcess,
    /// Discard the photo and open the camera again
    Retake,
    /// Close the result popup
    CloseResult,
    /// Hide the current notification
    DismissNotification,
}

impl Session {
    /// Route a UI action to the matching transition
    pub async fn dispatch(&mut self, action: UiAction) -> Result<(), SessionError> {
        if !matches!(action, UiAction::DragMove { .. }) {
            debug!("Action {:?} in phase {}", action, self.phase().name());
        }

        match action {
            UiAction::StartCapture => self.start_capture().await,
            UiAction::StopCapture => self.stop_capture(),
            UiAction::TakePhoto => self.capture_photo(),
            UiAction::DragStart => self.drag_start(),
            UiAction::DragMove { x, y } => self.drag_move(x, y),
            UiAction::DragEnd => self.drag_end(),
            UiAction::Process => self.process().await,
            UiAction::CancelProcess => self.cancel_process(),
            UiAction::Retake => self.retake().await,
            UiAction::CloseResult => self.dismiss(),
            UiAction::DismissNotification => {
                self.clear_notification();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{dataset, FakeCamera, FakeRecognizer};
    use crate::session::{Phase, SessionSettings};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_dispatch_drives_cycle() {
        let mut session = Session::new(
            SessionSettings::default(),
            Arc::new(FakeCamera::default()),
            Arc::new(FakeRecognizer::text("Столица России")),
            dataset(),
        );

        let script = [
            (UiAction::StartCapture, Phase::Streaming),
            (UiAction::TakePhoto, Phase::Captured),
            (UiAction::DragStart, Phase::Captured),
            (UiAction::DragMove { x: 200.0, y: 100.0 }, Phase::Captured),
            (UiAction::DragEnd, Phase::Captured),
            (UiAction::Process, Phase::ResultShown),
            (UiAction::CloseResult, Phase::Captured),
            (UiAction::Retake, Phase::Streaming),
            (UiAction::StopCapture, Phase::Idle),
        ];

        for (action, expected) in script {
            session.dispatch(action).await.unwrap();
            assert_eq!(session.phase(), expected, "after {:?}", action);
        }
    }

    #[tokio::test]
    async fn test_dispatch_rejects_out_of_order_action() {
        let mut session = Session::new(
            SessionSettings::default(),
            Arc::new(FakeCamera::default()),
            Arc::new(FakeRecognizer::text("")),
            dataset(),
        );

        let err = session.dispatch(UiAction::CloseResult).await.unwrap_err();
        assert_eq!(err.to_string(), "cannot close the result while idle");

        let err = session.dispatch(UiAction::CancelProcess).await.unwrap_err();
        assert_eq!(err.to_string(), "cannot cancel processing while idle");
    }

    #[tokio::test]
    async fn test_dispatch_cancels_detached_job() {
        let mut session = Session::new(
            SessionSettings::default(),
            Arc::new(FakeCamera::default()),
            Arc::new(FakeRecognizer::text("Столица России")),
            dataset(),
        );
        session.dispatch(UiAction::StartCapture).await.unwrap();
        session.dispatch(UiAction::TakePhoto).await.unwrap();

        let _job = session.begin_process().unwrap();
        session.dispatch(UiAction::CancelProcess).await.unwrap();
        assert_eq!(session.phase(), Phase::Captured);
    }

    #[tokio::test]
    async fn test_dispatch_dismisses_notification() {
        let camera = FakeCamera {
            fail: true,
            ..Default::default()
        };
        let mut session = Session::new(
            SessionSettings::default(),
            Arc::new(camera),
            Arc::new(FakeRecognizer::text("")),
            dataset(),
        );

        session.dispatch(UiAction::StartCapture).await.unwrap();
        assert!(session.view().notification.is_some());

        session.dispatch(UiAction::DismissNotification).await.unwrap();
        assert!(session.view().notification.is_none());
        assert_eq!(session.phase(), Phase::Idle);
    }
}
