//! Centralized Contract Definitions
//!
//! Solidity interfaces for the 1inch AggregationRouterV4 swap entry points and
//! the ERC20 approve call, defined with alloy's `sol!` macro. The generated
//! call types carry the selectors and the ABI codecs used by the decoder.
//!
//! Created: 2026-10-18

use alloy::sol;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

// ── 1inch AggregationRouterV4 ─────────────────────────────────────────

sol! {
    interface IAggregationRouterV4 {
        struct SwapDescription {
            address srcToken;
            address dstToken;
            address payable srcReceiver;
            address payable dstReceiver;
            uint256 amount;
            uint256 minReturnAmount;
            uint256 flags;
            bytes permit;
        }

        struct OrderRFQ {
            uint256 info;
            address makerAsset;
            address takerAsset;
            address maker;
            address allowedSender;
            uint256 makingAmount;
            uint256 takingAmount;
        }

        function swap(address caller, SwapDescription calldata desc, bytes calldata data) external payable returns (uint256 returnAmount, uint256 spentAmount, uint256 gasLeft);

        function unoswap(address srcToken, uint256 amount, uint256 minReturn, bytes32[] calldata pools) external payable returns (uint256 returnAmount);

        function unoswapWithPermit(address srcToken, uint256 amount, uint256 minReturn, bytes32[] calldata pools, bytes calldata permit) external returns (uint256 returnAmount);

        function uniswapV3Swap(uint256 amount, uint256 minReturn, uint256[] calldata pools) external payable returns (uint256 returnAmount);

        function uniswapV3SwapTo(address payable recipient, uint256 amount, uint256 minReturn, uint256[] calldata pools) external payable returns (uint256 returnAmount);

        function clipperSwap(address srcToken, address dstToken, uint256 amount, uint256 minReturn) external payable returns (uint256 returnAmount);

        function fillOrderRFQ(OrderRFQ memory order, bytes calldata signature, uint256 makingAmount, uint256 takingAmount) external payable returns (uint256, uint256);
    }
}
