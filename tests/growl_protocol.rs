use tokio::net::UdpSocket;

use testwatch::notification::packet::{compute_checksum, CHECKSUM_LEN};
use testwatch::notification::{GrowlNotifier, Packet, PacketError, UdpTransport};

async fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

#[tokio::test]
async fn registration_round_trips_over_udp() {
    let (socket, port) = receiver().await;
    let mut notifier = GrowlNotifier::new(UdpTransport::new("127.0.0.1", port), "demo", "secret");
    notifier.register().await.unwrap();

    let mut buf = vec![0u8; 2048];
    let (n, _) = socket.recv_from(&mut buf).await.unwrap();
    let datagram = &buf[..n];

    // Trailer is MD5(body ‖ password).
    let (body, checksum) = datagram.split_at(n - CHECKSUM_LEN);
    assert_eq!(checksum, compute_checksum(body, "secret"));
    assert_eq!(&body[..2], &[1, 0]);

    let Packet::Registration(reg) = Packet::decode(datagram, "secret").unwrap() else {
        panic!("expected a registration packet");
    };
    assert_eq!(reg.application, "demo");
    assert_eq!(reg.notifications.len(), 2);
    assert_eq!(reg.notifications, vec!["error", "failure"]);
    assert_eq!(reg.defaults, vec![0, 1]);

    assert_eq!(
        Packet::decode(datagram, "wrong"),
        Err(PacketError::ChecksumMismatch)
    );
}

#[tokio::test]
async fn send_failure_is_returned_not_raised() {
    let mut notifier =
        GrowlNotifier::new(UdpTransport::new("no-such-host.invalid.", 9887), "demo", "secret");
    assert!(notifier.register().await.is_err());
    assert!(!notifier.is_registered());
}
