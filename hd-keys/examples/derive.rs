//! Basic derivation example for hd-keys

use hd_keys::prelude::*;

fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    println!("HD Keys Example\n");

    let seed = hex::decode("000102030405060708090a0b0c0d0e0f")?;

    // 1. BIP32 on secp256k1
    println!("1. secp256k1 master from seed...");
    let master = Bip32Context::from_seed(Curve::Secp256k1, KeyNetVersions::MAINNET, &seed)?;
    println!("   xprv: {}", master);
    println!("   xpub: {}", master.clone().convert_to_public());

    // 2. Derive a BIP44 account and a watch-only branch
    println!("\n2. Deriving m/44'/0'/0'...");
    let account = master.derive_path("m/44'/0'/0'")?;
    println!("   Account xprv: {}", account);

    let watch_only = account.convert_to_public();
    println!("   Watch-only receive keys:");
    for i in 0..3 {
        let child = watch_only.derive_path(&format!("0/{}", i))?;
        println!("     {}: {}", i, hex::encode(child.public_key().serialize()));
    }

    // 3. SLIP-0010 ed25519 only allows hardened steps
    println!("\n3. ed25519 master from the same seed...");
    let master = Bip32Context::from_seed(Curve::Ed25519, KeyNetVersions::MAINNET, &seed)?;
    let child = master.derive_path("m/44'/501'/0'")?;
    println!("   m/44'/501'/0' public key: {}", hex::encode(child.public_key().serialize()));

    // 4. Cardano-style extended ed25519 mixes hardened and soft steps
    println!("\n4. Extended ed25519 (Cardano scheme)...");
    let master = Bip32Context::from_seed(Curve::Ed25519Kholaw, KeyNetVersions::MAINNET, &seed)?;
    let child = master.derive_path("m/1852'/1815'/0'/0/0")?;
    println!("   m/1852'/1815'/0'/0/0 public key: {}", hex::encode(child.public_key().serialize()));

    Ok(())
}
