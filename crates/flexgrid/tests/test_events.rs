//! Integration tests for layout events.

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use flexgrid::{
        Core,
        error::Result,
        event::Event,
        geom::{Expanse, Rect},
        testing::backend::TestTerminal,
    };
    use pretty_assertions::assert_eq;

    fn core() -> Core {
        let (_, tt) = TestTerminal::create(Expanse::new(20, 5));
        Core::new(tt)
    }

    #[test]
    fn children_fire_before_parents_in_registration_order() -> Result<()> {
        let c = core();
        let root = c.root_id();
        let child = c.create();
        c.add_child(root, child)?;

        let log = Arc::new(Mutex::new(Vec::new()));
        for (node, name) in [(root, "root-1"), (child, "child"), (root, "root-2")] {
            let log = Arc::clone(&log);
            c.add_event_listener(node, Event::LayoutUpdated, move |_, _| {
                log.lock().unwrap().push(name);
            })?;
        }
        c.update_layout(root)?;
        assert_eq!(*log.lock().unwrap(), vec!["child", "root-1", "root-2"]);
        Ok(())
    }

    #[test]
    fn removed_listeners_stop_firing() -> Result<()> {
        let c = core();
        let root = c.root_id();
        let hits = Arc::new(Mutex::new(0));
        let h = Arc::clone(&hits);
        let id = c.add_event_listener(root, Event::LayoutUpdated, move |_, _| {
            *h.lock().unwrap() += 1;
        })?;
        c.update_layout(root)?;
        assert!(c.remove_event_listener(root, Event::LayoutUpdated, id)?);
        c.update_layout(root)?;
        assert_eq!(*hits.lock().unwrap(), 1);
        Ok(())
    }

    #[test]
    fn listener_sees_final_box() -> Result<()> {
        let c = core();
        let root = c.root_id();
        let a = c.create();
        c.set_length(a, 7)?;
        c.add_child(root, a)?;
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        c.add_event_listener(a, Event::LayoutUpdated, move |core, id| {
            *s.lock().unwrap() = core.rect(id).ok();
        })?;
        c.update_layout(root)?;
        assert_eq!(*seen.lock().unwrap(), Some(Rect::new(0, 0, 5, 7)));
        Ok(())
    }

    #[test]
    fn listener_may_change_the_tree_and_relayout() -> Result<()> {
        let c = core();
        let root = c.root_id();
        let a = c.create();
        c.set_length(a, 4)?;
        c.add_child(root, a)?;
        let b = c.create();
        c.add_child(root, b)?;

        let once = AtomicBool::new(true);
        c.add_event_listener(root, Event::LayoutUpdated, move |core, id| {
            if once.swap(false, Ordering::SeqCst) {
                core.set_length(a, 12).unwrap();
                core.update_layout(id).unwrap();
            }
        })?;
        c.update_layout(root)?;
        assert_eq!(c.rect(a)?, Rect::new(0, 0, 5, 12));
        assert_eq!(c.rect(b)?, Rect::new(0, 12, 5, 20));
        Ok(())
    }
}
