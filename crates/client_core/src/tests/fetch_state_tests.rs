use super::*;
use tokio::sync::oneshot;

#[test]
fn starts_idle_and_submittable() {
    let controller = FetchController::<u32>::new(ViewKind::Search);
    assert_eq!(controller.state(), FetchState::Idle);
    assert!(controller.can_submit());
    assert_eq!(controller.view(), ViewKind::Search);
}

#[test]
fn begin_clears_previous_result() {
    let controller = FetchController::new(ViewKind::List);
    controller.settle(Ok(3_u32));
    assert_eq!(controller.map_result(|value| value * 2), Some(6));

    controller.begin();
    assert_eq!(controller.state(), FetchState::Loading);
    assert!(!controller.can_submit());
    assert_eq!(controller.map_result(|value| *value), None);
}

#[test]
fn reject_replaces_previous_result() {
    let controller = FetchController::new(ViewKind::Registration);
    controller.settle(Ok("old"));
    controller.reject("Enter a registration/device id");
    assert_eq!(
        controller.state(),
        FetchState::Error("Enter a registration/device id".to_string())
    );
}

#[test]
fn settle_stores_error_display_string() {
    let controller = FetchController::<u32>::new(ViewKind::List);
    controller.begin();
    controller.settle(Err(ClientError::Http {
        status: 502,
        body: "upstream unavailable".to_string(),
    }));

    let state = controller.state();
    assert!(state.is_settled());
    assert_eq!(state.error(), Some("upstream unavailable"));
    assert!(controller.can_submit());
}

#[test]
fn reset_returns_to_idle() {
    let controller = FetchController::new(ViewKind::List);
    controller.settle(Ok(1_u8));
    controller.reset();
    assert_eq!(controller.state(), FetchState::Idle);
    assert!(!controller.state().is_settled());
}

#[tokio::test]
async fn subscribers_observe_loading_while_request_in_flight() {
    let controller = FetchController::<u32>::new(ViewKind::List);
    let mut states = controller.subscribe();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    let request = controller.run(async move {
        let _ = release_rx.await;
        Ok(7)
    });
    let observer = async move {
        states.changed().await.expect("loading transition");
        assert!(states.borrow_and_update().is_loading());
        release_tx.send(()).expect("release request");

        states.changed().await.expect("settled transition");
        assert_eq!(*states.borrow(), FetchState::Success(7));
    };

    tokio::join!(request, observer);
    assert_eq!(controller.state().result(), Some(&7));
}
