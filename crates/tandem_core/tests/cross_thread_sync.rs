//! # Cross-Thread Synchronization Tests
//!
//! Drives the command queue and the frame slot store from two real threads,
//! with a hand-written consumer standing in for the render thread.
//!
//! Run with: cargo test -p tandem_core --test cross_thread_sync

use std::thread;

use tandem_core::{command_queue, Batch, FrameSlotStore, HandleAllocator, RenderCommand, RenderObjectId};
use tandem_shared::{Transform, Vec3};

#[test]
fn consumer_sees_every_frame_whole_and_in_order() {
    const FRAMES: u64 = 500;
    const OBJECTS: u32 = 16;

    let store = FrameSlotStore::new(3);
    let (mut sender, receiver) = command_queue(64);

    let consumer = {
        let store = std::sync::Arc::clone(&store);
        thread::spawn(move || {
            let mut batch = Vec::new();
            let mut next_sequence = 0;
            let mut frames_seen = 0;

            loop {
                batch.clear();
                let status = receiver.wait_batch(&mut batch);
                for command in &batch {
                    assert_eq!(command.sequence, next_sequence);
                    next_sequence += 1;

                    if let RenderCommand::EndFrame { frame } = command.command {
                        assert_eq!(frame.frame(), frames_seen);
                        {
                            let published = store.read(frame);
                            assert_eq!(published.len(), OBJECTS as usize);
                            let expected = frame.frame() as f32;
                            assert!(published.transforms().all(|(_, t)| t.position.x == expected));
                        }
                        store.retire(frame);
                        frames_seen += 1;
                    }
                }
                if status == Batch::ShutdownRequested {
                    break;
                }
            }
            store.close();
            frames_seen
        })
    };

    let mut handles = HandleAllocator::new();
    let ids: Vec<RenderObjectId> = (0..OBJECTS).map(|_| handles.allocate()).collect();

    for _ in 0..FRAMES {
        let token = store.current_frame();
        let x = token.frame() as f32;
        for &id in &ids {
            store.write(token, id, Transform::from_position(Vec3::new(x, 0.0, 0.0)));
        }
        store.publish(token);
        sender.enqueue(RenderCommand::EndFrame { frame: token }).unwrap();
        let _ = store.acquire_writable();

        // The ring never holds more than frames_in_flight published frames
        assert!(store.published_count() <= store.frames_in_flight());
    }
    sender.close();

    assert_eq!(consumer.join().unwrap(), FRAMES);
    assert_eq!(store.frames_published(), FRAMES);
    assert_eq!(store.frames_retired(), FRAMES);
}

#[test]
fn destroyed_handle_never_matches_reused_slot() {
    let mut handles = HandleAllocator::new();
    let store = FrameSlotStore::new(1);

    let old = handles.allocate();
    let token = store.current_frame();
    store.write(token, old, Transform::IDENTITY);
    handles.release(old);
    let new = handles.allocate();
    assert_eq!(old.index(), new.index());

    store.publish(token);
    let frame = store.read(token);
    assert!(frame.get(old).is_some());
    assert!(frame.get(new).is_none());
}
