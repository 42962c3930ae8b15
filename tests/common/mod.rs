#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const TWO_KEY_LISTING: &str = r#"tru::1:1409337986:0:3:1:5
pub:-:2048:17:CAFEBABEDEADBEEF:1400000000:::-:::scSC::::::23::0:
fpr:::::::::AAAABBBBCCCCDDDDEEEEFFFF0000111122223333:
uid:-::::1400000000::HASH::Alice <alice@example.com>::::::::::0:
sub:-:2048:16:FEDCBA9876543210:1400000000::::::e::::::23:
fpr:::::::::9999888877776666555544443333222211110000:
pub:-:4096:1:0000000012345678:1500000000:::-:::scSC::::::23::0:
fpr:::::::::0123456789ABCDEF0123456789ABCDEF01234567:
uid:-::::1500000000::HASH::Bob "the builder" & Co <bob@example.org>::::::::::0:
"#;

/// Installs a shell script standing in for gpg2 and returns its path.
///
/// The script sees the same arguments gpg2 would; the keyring path is `$6`.
#[cfg(unix)]
pub fn fake_lister(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake lister");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake lister");
    path
}

/// Creates an (empty) keyring file for the fake listers to be pointed at.
pub fn keyring_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").expect("write keyring file");
    path
}

/// A fake lister that prints `listing` when called with the expected arguments.
///
/// Like gpg, it refuses keyring paths without a `/`, which gpg would look up
/// in its home directory.
#[cfg(unix)]
pub fn listing_script(dir: &Path, listing: &str) -> PathBuf {
    let body = format!(
        r#"if [ "$1 $2 $3 $4 $5" != "--fingerprint --no-default-keyring --no-options --with-colons --keyring" ]; then
    echo "unexpected arguments: $*" >&2
    exit 2
fi
case "$6" in
    */*) ;;
    *) echo "keyring path without a slash: $6" >&2; exit 2 ;;
esac
cat <<'LISTING'
{listing}LISTING"#
    );
    fake_lister(dir, "fake-gpg", &body)
}
