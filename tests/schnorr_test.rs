use cryptbox::schnorr;

fn unhex(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap()
}

struct SchnorrVector {
    secret: &'static str,
    public: &'static str,
    msg: &'static str,
    sig: &'static str,
}

// Test vectors for the jacobi-canonicalized scheme (bip-schnorr draft).
const VECTORS: &[SchnorrVector] = &[
    SchnorrVector {
        secret: "0000000000000000000000000000000000000000000000000000000000000001",
        public: "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        msg: "0000000000000000000000000000000000000000000000000000000000000000",
        sig: "787a848e71043d280c50470e8e1532b2dd5d20ee912a45dbdd2bd1dfbf187ef6\
              7031a98831859dc34dffeedda86831842ccd0079e1f92af177f7f22cc1dced05",
    },
    SchnorrVector {
        secret: "b7e151628aed2a6abf7158809cf4f3c762e7160f38b4da56a784d9045190cfef",
        public: "02dff1d77f2a671c5f36183726db2341be58feae1da2deced843240f7b502ba659",
        msg: "243f6a8885a308d313198a2e03707344a4093822299f31d0082efa98ec4e6c89",
        sig: "2a298dacae57395a15d0795ddbfd1dcb564da82b0f269bc70a74f8220429ba1d\
              1e51a22ccec35599b8f266912281f8365ffc2d035a230434a1a64dc59f7013fd",
    },
];

#[test]
fn test_known_vectors() {
    for vector in VECTORS {
        let secret = unhex(vector.secret);
        let public = unhex(vector.public);
        let msg = unhex(vector.msg);
        let sig = unhex(vector.sig);

        assert_eq!(schnorr::sign(&msg, &secret).unwrap()[..], sig[..]);
        assert!(schnorr::verify(&msg, &sig, &public));
    }
}

#[test]
fn test_known_vectors_as_batch() {
    let parts: Vec<(Vec<u8>, Vec<u8>, Vec<u8>)> = VECTORS
        .iter()
        .map(|v| (unhex(v.msg), unhex(v.sig), unhex(v.public)))
        .collect();
    let batch: Vec<(&[u8], &[u8], &[u8])> = parts
        .iter()
        .map(|(m, s, k)| (&m[..], &s[..], &k[..]))
        .collect();
    assert!(schnorr::batch_verify(&batch));

    // Corrupting any entry sinks the batch.
    let mut bad_sig = unhex(VECTORS[0].sig);
    bad_sig[50] ^= 1;
    let mut bad = batch.clone();
    bad[0].1 = &bad_sig;
    assert!(!schnorr::batch_verify(&bad));

    assert!(schnorr::batch_verify(&[]));
}

#[test]
fn test_tampering_fails() {
    let vector = &VECTORS[1];
    let public = unhex(vector.public);
    let msg = unhex(vector.msg);
    let sig = unhex(vector.sig);

    for i in 0..sig.len() {
        let mut bad = sig.clone();
        bad[i] ^= 0x20;
        assert!(!schnorr::verify(&msg, &bad, &public), "sig byte {i}");
    }
    let mut bad_msg = msg.clone();
    bad_msg[0] ^= 1;
    assert!(!schnorr::verify(&bad_msg, &sig, &public));
}

#[test]
fn test_verify_rejects_out_of_range_components() {
    let vector = &VECTORS[0];
    let public = unhex(vector.public);
    let msg = unhex(vector.msg);
    let sig = unhex(vector.sig);

    // x(R) ≥ p.
    let mut bad = sig.clone();
    for byte in bad[..32].iter_mut() {
        *byte = 0xff;
    }
    assert!(!schnorr::verify(&msg, &bad, &public));

    // S ≥ n.
    let mut bad = sig.clone();
    for byte in bad[32..].iter_mut() {
        *byte = 0xff;
    }
    assert!(!schnorr::verify(&msg, &bad, &public));

    // Public key not on the curve (documented non-residue x).
    let off_curve = unhex("02eefdea4cdb677750a420fee807eacf21eb9898ae79b9768766e4faa04a2d4a34");
    assert!(!schnorr::verify(&msg, &sig, &off_curve));
}
