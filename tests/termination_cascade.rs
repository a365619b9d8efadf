// SPDX-License-Identifier: MIT OR Apache-2.0

//! §8 scenario 4: when a peer's shell stops, its watchers observe the termination, drop it from
//! their own peer set, and — if that was their last peer — cancel the round timer (§4.2, §4.4
//! "timer idleness", §8 invariant "Timer idleness").

mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use common::{fast_settings, init, topic, TestNode};
use gossip_shell::test_support::{dump_request, MaxSetLogic};

#[tokio::test]
async fn surviving_peer_drops_terminated_peer_and_goes_idle() {
    init();

    let alice = TestNode::spawn(
        "alice",
        fast_settings(),
        Box::new(|ctx| Box::new(MaxSetLogic::with_seed(ctx, vec![1]))),
    )
    .await;
    let bob = TestNode::spawn(
        "bob",
        fast_settings(),
        Box::new(|ctx| Box::new(MaxSetLogic::with_seed(ctx, vec![2]))),
    )
    .await;

    alice.control.introduce(bob.peer_handle()).unwrap();
    bob.control.introduce(alice.peer_handle()).unwrap();
    alice.control.update(topic(), BTreeSet::new()).unwrap();
    bob.control.update(topic(), BTreeSet::new()).unwrap();

    // Let at least one round elapse so the two are actually gossiping before bob disappears.
    tokio::time::sleep(Duration::from_millis(120)).await;

    bob.shutdown().await;

    // Give alice's supervision handler time to process the termination.
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Alice is still alive and answers side-channel asks for its own identifier; its gossip
    // never blows up even though its only peer vanished (the round scheduler simply goes idle).
    let (msg, rx) = dump_request();
    alice
        .control
        .side_channel_tell(topic(), msg)
        .await
        .expect("alice survives its peer's termination");
    let alice_values = rx.await.expect("alice's logic still responds");
    assert!(alice_values.contains(&1));

    // Re-introducing a fresh peer revives gossip (the timer isn't permanently wedged off).
    let carol = TestNode::spawn(
        "carol",
        fast_settings(),
        Box::new(|ctx| Box::new(MaxSetLogic::with_seed(ctx, vec![3]))),
    )
    .await;
    alice.control.introduce(carol.peer_handle()).unwrap();
    carol.control.introduce(alice.peer_handle()).unwrap();
    carol.control.update(topic(), BTreeSet::new()).unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        let (msg, rx) = dump_request();
        carol
            .control
            .side_channel_tell(topic(), msg)
            .await
            .unwrap();
        let carol_values = rx.await.unwrap();
        if carol_values.contains(&1) {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("alice did not resume gossiping after a fresh peer was introduced");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    alice.shutdown().await;
    carol.shutdown().await;
}
