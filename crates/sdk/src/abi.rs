//! Contract surfaces of the launchpad, declared with [`alloy::sol!`].
//!
//! Reads go through the generated `*Instance` types with `.call()`;
//! state-changing calls are ABI-encoded here and submitted through
//! [`crate::lifecycle::WalletGateway`].

use alloy::sol;

sol! {
    /// Deploys launchpad tokens and records their immutable metadata.
    #[sol(rpc)]
    contract TokenFactory {
        struct TokenInfo {
            address token;
            string name;
            string symbol;
            string imageUri;
            string description;
            address creator;
            uint64 createdAt;
            uint256 totalSupply;
            bool active;
        }

        function tokenCount() external view returns (uint256);
        function tokenAt(uint256 index) external view returns (address);
        function tokenInfo(address token) external view returns (TokenInfo memory);
        function createToken(
            string name,
            string symbol,
            string imageUri,
            string description
        ) external payable returns (address);
    }

    /// Bonding curve every launched token trades against until graduation.
    #[sol(rpc)]
    contract BondingCurve {
        struct CurveInfo {
            uint256 soldSupply;
            uint256 reservesIn;
            uint256 virtualReserveQuote;
            uint256 virtualReserveToken;
            bool graduated;
            bool active;
        }

        function curveInfo(address token) external view returns (CurveInfo memory);
        /// Quote-asset cost of buying `tokenAmount` at the current curve point.
        function buyQuote(address token, uint256 tokenAmount) external view returns (uint256);
        function totalFeesOf(address token) external view returns (uint256);
        function pendingFeesOf(address token) external view returns (uint256);
        function initialize(address token) external;
        function buy(address token, uint256 minTokensOut) external payable;
        function sell(address token, uint256 tokenAmount, uint256 minQuoteOut) external;
    }

    /// Records executed graduations and the resulting DEX pair.
    #[sol(rpc)]
    contract GraduationRegistry {
        function isGraduated(address token) external view returns (bool);
        /// Threshold met but graduation not yet executed.
        function checkGraduation(address token) external view returns (bool);
        function pairFor(address token) external view returns (address);
        function graduate(address token) external;
        function listOnDex(address token) external;
    }

    /// Per-user permission checks.
    #[sol(rpc)]
    contract AccessRegistry {
        function isAllowed(address user) external view returns (bool);
        function canCreateToken(address user) external view returns (bool);
    }

    /// Standard fungible-token surface of every launched token.
    #[sol(rpc)]
    contract Erc20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function totalSupply() external view returns (uint256);
    }
}
