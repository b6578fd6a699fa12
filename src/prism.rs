// Proxy selector validation
//
// A prism proxy forwards every call it does not implement itself to its
// implementation. A function whose selector exists on both sides is only
// reachable on the proxy, so such clashes must be caught before deploying.

use std::fmt;

use ethers::abi::Abi;

/// A selector shared by the proxy and its implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorClash {
    pub selector: [u8; 4],
    pub proxy_fn: String,
    pub implementation_fn: String,
}

impl fmt::Display for SelectorClash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{} ({} / {})",
            hex::encode(self.selector),
            self.proxy_fn,
            self.implementation_fn
        )
    }
}

/// Every proxy function whose selector also belongs to an implementation function
pub fn find_selector_clashes(proxy: &Abi, implementation: &Abi) -> Vec<SelectorClash> {
    let mut clashes = Vec::new();
    for proxy_fn in proxy.functions() {
        let selector = proxy_fn.short_signature();
        for implementation_fn in implementation.functions() {
            if implementation_fn.short_signature() == selector {
                clashes.push(SelectorClash {
                    selector,
                    proxy_fn: proxy_fn.signature(),
                    implementation_fn: implementation_fn.signature(),
                });
            }
        }
    }
    clashes
}
