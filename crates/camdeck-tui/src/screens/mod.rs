//! Screen implementations. Each screen is a top-level Component.

pub mod camera;
pub mod cameras;
pub mod live;
pub mod login;
pub mod nvrs;
pub mod recordings;
pub mod users;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create all screen components.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Live, Box::new(live::LiveScreen::new())),
        (ScreenId::Cameras, Box::new(cameras::CamerasScreen::new())),
        (ScreenId::Nvrs, Box::new(nvrs::NvrsScreen::new())),
        (ScreenId::Users, Box::new(users::UsersScreen::new())),
        (
            ScreenId::Recordings,
            Box::new(recordings::RecordingsScreen::new()),
        ),
        (ScreenId::Camera, Box::new(camera::CameraScreen::new())),
        (ScreenId::Login, Box::new(login::LoginScreen::new())),
    ]
}

/// Append-or-replace-by-id: the merge every inventory list applies to a
/// successful create/update response instead of refetching.
pub fn merge_by_id<T>(list: &mut Vec<T>, item: T, id_of: impl Fn(&T) -> i64) {
    let id = id_of(&item);
    if let Some(slot) = list.iter_mut().find(|existing| id_of(existing) == id) {
        *slot = item;
    } else {
        list.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Rec {
        id: i64,
        name: &'static str,
    }

    #[test]
    fn merge_appends_unknown_id() {
        let mut list = vec![Rec { id: 1, name: "a" }];
        merge_by_id(&mut list, Rec { id: 2, name: "b" }, |r| r.id);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn merge_replaces_known_id_exactly_once() {
        let mut list = vec![Rec { id: 1, name: "a" }, Rec { id: 2, name: "b" }];
        merge_by_id(&mut list, Rec { id: 2, name: "b2" }, |r| r.id);
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], Rec { id: 2, name: "b2" });
    }
}
